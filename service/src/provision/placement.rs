//! Placement of fields on form and view displays
//!
//! These functions only touch the display records they are given; loading
//! and saving is left to the provisioner.

use content_model_core::config::ViewPlacement;
use content_model_core::error::{ContentModelError, Result};
use content_model_core::records::{
    BlockConfiguration, DisplayKey, FormDisplayRecord, SectionComponent, ViewDisplayRecord,
    WidgetComponent,
};
use content_model_core::types::{FieldDefinition, FieldGroup, FormatterConfig, WidgetConfig};
use indexmap::IndexMap;
use uuid::Uuid;

/// Block id of a field block: `field_block:<kind>:<bundle>:<field>`
#[must_use]
pub fn block_id(entity_kind: &str, bundle: &str, field_name: &str) -> String {
    format!("field_block:{entity_kind}:{bundle}:{field_name}")
}

/// Stable uuid for a block placed on a display. The same display and block
/// always get the same uuid, so repeated runs do not churn identities.
#[must_use]
pub fn component_uuid(key: &DisplayKey, block_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{key}/{block_id}").as_bytes())
}

/// Field group id on a form display
#[must_use]
pub fn group_id(group: FieldGroup) -> String {
    format!("group_{group}")
}

/// Block configuration rendering `field` with `formatter`
#[must_use]
pub fn block_configuration(
    key: &DisplayKey,
    field: &FieldDefinition,
    formatter: FormatterConfig,
) -> BlockConfiguration {
    let mut context_mapping = IndexMap::new();
    context_mapping.insert("entity".to_string(), "layout_builder.entity".to_string());
    context_mapping.insert("view_mode".to_string(), "view_mode".to_string());

    BlockConfiguration {
        id: block_id(&key.entity_kind, &key.bundle, &field.name),
        label: field.label.clone(),
        provider: "layout_builder".to_string(),
        label_display: "0".to_string(),
        context_mapping,
        formatter,
    }
}

/// Put a field widget on a form display, adding the field to `group` if given.
/// Returns `true` if the widget was not on the display before.
pub fn place_in_form(
    display: &mut FormDisplayRecord,
    field_name: &str,
    widget: WidgetConfig,
    weight: i64,
    group: Option<FieldGroup>,
) -> bool {
    if let Some(group) = group {
        let settings = display.field_groups.entry(group_id(group)).or_default();
        if !settings.children.iter().any(|child| child == field_name) {
            settings.children.push(field_name.to_string());
        }
    }

    display
        .components
        .insert(field_name.to_string(), WidgetComponent { widget, weight })
        .is_none()
}

/// Put a block on a view display. An existing block with the same id is
/// updated in place, keeping its uuid; otherwise a new component is appended.
/// Returns `true` if the block was appended.
///
/// # Errors
///
/// Returns `HostApi` if the display has no section at `placement.section`.
pub fn place_in_view(
    display: &mut ViewDisplayRecord,
    placement: &ViewPlacement,
    configuration: BlockConfiguration,
    weight: i64,
) -> Result<bool> {
    let key = display.key.clone();
    let section_count = display.sections.len();
    let section = display.sections.get_mut(placement.section).ok_or_else(|| {
        ContentModelError::host_api(
            format!("place {} on view display {key}", configuration.id),
            format!(
                "display has {section_count} section(s), no section {}",
                placement.section
            ),
        )
    })?;

    if let Some(component) = section.component_mut(&configuration.id) {
        component.configuration = configuration;
        component.weight = weight;
        component.region.clone_from(&placement.region);
        return Ok(false);
    }

    section.components.push(SectionComponent {
        uuid: component_uuid(&key, &configuration.id),
        region: placement.region.clone(),
        weight,
        configuration,
    });
    Ok(true)
}

/// Re-address a display cloned from a template bundle: every field block
/// pointing at `from_bundle` is pointed at the display's own bundle and given
/// that display's component uuid.
pub fn rebind_view_display(display: &mut ViewDisplayRecord, from_bundle: &str) {
    let key = display.key.clone();
    let from = format!("field_block:{}:{from_bundle}:", key.entity_kind);
    let to = format!("field_block:{}:{}:", key.entity_kind, key.bundle);

    for component in display
        .sections
        .iter_mut()
        .flat_map(|section| section.components.iter_mut())
    {
        if let Some(field) = component.configuration.id.strip_prefix(&from) {
            component.configuration.id = format!("{to}{field}");
            component.uuid = component_uuid(&key, &component.configuration.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_model_core::types::LabelPosition;
    use serde_json::json;

    fn field(required: bool) -> FieldDefinition {
        FieldDefinition {
            name: "field_title".to_string(),
            label: "Title".to_string(),
            description: String::new(),
            type_tag: "Text (255)".to_string(),
            required,
            cardinality: 1,
            weight: 12,
            group: FieldGroup::Meta,
            source_row: 12,
        }
    }

    fn formatter() -> FormatterConfig {
        FormatterConfig {
            label: LabelPosition::Inline,
            formatter: "string".to_string(),
            settings: json!({ "link_to_entity": false }),
        }
    }

    #[test]
    fn test_block_configuration() {
        let key = DisplayKey::new("node", "article", "full");
        let config = block_configuration(&key, &field(false), formatter());
        assert_eq!(config.id, "field_block:node:article:field_title");
        assert_eq!(config.label_display, "0");
        assert_eq!(config.context_mapping["entity"], "layout_builder.entity");
        assert_eq!(config.context_mapping["view_mode"], "view_mode");
    }

    #[test]
    fn test_place_in_view_updates_existing_block() {
        let key = DisplayKey::new("node", "article", "full");
        let mut display = ViewDisplayRecord::with_sections(key.clone(), 2);
        let placement = ViewPlacement::new("full", 1, "content");

        let created = place_in_view(
            &mut display,
            &placement,
            block_configuration(&key, &field(false), formatter()),
            12,
        )
        .unwrap();
        assert!(created);
        let uuid = display.sections[1].components[0].uuid;

        let created = place_in_view(
            &mut display,
            &placement,
            block_configuration(&key, &field(false), formatter()),
            3,
        )
        .unwrap();
        assert!(!created);
        assert_eq!(display.sections[1].components.len(), 1);
        assert_eq!(display.sections[1].components[0].uuid, uuid);
        assert_eq!(display.sections[1].components[0].weight, 3);
    }

    #[test]
    fn test_place_in_view_missing_section() {
        let key = DisplayKey::new("node", "article", "search_index");
        let mut display = ViewDisplayRecord::with_sections(key.clone(), 0);
        let err = place_in_view(
            &mut display,
            &ViewPlacement::new("search_index", 0, "content"),
            block_configuration(&key, &field(false), formatter()),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ContentModelError::HostApi { .. }));
    }

    #[test]
    fn test_place_in_form_group_children_unique() {
        let mut display = FormDisplayRecord::new(DisplayKey::new("node", "article", "default"));
        let widget = WidgetConfig {
            widget: "string_textfield".to_string(),
            settings: json!({}),
        };

        assert!(place_in_form(&mut display, "field_title", widget.clone(), 12, Some(FieldGroup::Meta)));
        assert!(!place_in_form(&mut display, "field_title", widget, 12, Some(FieldGroup::Meta)));
        assert_eq!(display.field_groups["group_meta"].children, vec!["field_title".to_string()]);
        assert_eq!(display.components["field_title"].weight, 12);
    }

    #[test]
    fn test_rebind_cloned_display() {
        let base_key = DisplayKey::new("node", "base", "full");
        let mut display = ViewDisplayRecord::with_sections(base_key.clone(), 1);
        place_in_view(
            &mut display,
            &ViewPlacement::new("full", 0, "content"),
            block_configuration(&base_key, &field(false), formatter()),
            1,
        )
        .unwrap();

        display.key = base_key.with_bundle("article");
        rebind_view_display(&mut display, "base");

        let component = &display.sections[0].components[0];
        assert_eq!(component.configuration.id, "field_block:node:article:field_title");
        assert_eq!(
            component.uuid,
            component_uuid(&display.key, "field_block:node:article:field_title")
        );
    }

    #[test]
    fn test_component_uuid_is_stable() {
        let key = DisplayKey::new("node", "article", "full");
        assert_eq!(component_uuid(&key, "a"), component_uuid(&key, "a"));
        assert_ne!(component_uuid(&key, "a"), component_uuid(&key, "b"));
    }
}
