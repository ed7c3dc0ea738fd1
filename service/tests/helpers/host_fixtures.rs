//! Template content seeded into hosts before provisioning

use content_model_core::records::{
    BlockConfiguration, ContentTypeRecord, DisplayKey, FieldGroupSettings, FieldInstanceRecord,
    FieldStorageRecord, FormDisplayRecord, LayoutSection, SectionComponent, ViewDisplayRecord,
};
use content_model_core::traits::ContentHost;
use content_model_core::types::{FormatterConfig, LabelPosition};
use content_model_core::Result;
use content_model_service::host::InMemoryHost;
use content_model_service::provision::placement::{block_id, component_uuid};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// Entity kind every fixture uses
pub const KIND: &str = "node";

/// Template type cloned by new content types
pub const TEMPLATE: &str = "base";

/// View modes registered on the host, `default` excluded
pub const VIEW_MODES: &[&str] = &[
    "full",
    "search",
    "search_index",
    "summary",
    "teaser",
    "teaser_inline",
];

/// In-memory host with modes registered and the template seeded
pub fn seeded_host() -> InMemoryHost {
    let mut host = InMemoryHost::new()
        .with_form_modes(KIND, &[])
        .with_view_modes(KIND, VIEW_MODES);
    seed_template(&mut host).expect("seeding the template should succeed");
    host
}

/// Seed the `base` template: the type, a tags field and every display
pub fn seed_template<H: ContentHost>(host: &mut H) -> Result<()> {
    let mut properties = IndexMap::new();
    properties.insert("new_revision".to_string(), Value::Bool(true));
    properties.insert("preview_mode".to_string(), json!(1));
    host.save_type(ContentTypeRecord {
        id: TEMPLATE.to_string(),
        uuid: None,
        label: "Base".to_string(),
        description: "Template for every content type".to_string(),
        properties,
    })?;

    host.save_field_storage(FieldStorageRecord {
        entity_kind: KIND.to_string(),
        field_name: "field_tags".to_string(),
        uuid: None,
        field_type: "entity_reference".to_string(),
        cardinality: -1,
        settings: json!({ "target_type": "taxonomy_term" }),
    })?;
    host.save_field_instance(FieldInstanceRecord {
        entity_kind: KIND.to_string(),
        bundle: TEMPLATE.to_string(),
        field_name: "field_tags".to_string(),
        uuid: None,
        field_type: "entity_reference".to_string(),
        label: "Tags".to_string(),
        description: String::new(),
        required: false,
        settings: json!({ "handler": "default:taxonomy_term" }),
    })?;

    let mut form = FormDisplayRecord::new(DisplayKey::new(KIND, TEMPLATE, "default"));
    for (group, label) in [("meta", "Meta"), ("content", "Content"), ("attach", "Attachments")] {
        let mut extra = IndexMap::new();
        extra.insert("label".to_string(), Value::from(label));
        extra.insert("format_type".to_string(), Value::from("details"));
        form.field_groups.insert(
            format!("group_{group}"),
            FieldGroupSettings {
                children: Vec::new(),
                extra,
            },
        );
    }
    host.save_form_display(form)?;

    for mode in std::iter::once("default").chain(VIEW_MODES.iter().copied()) {
        let key = DisplayKey::new(KIND, TEMPLATE, mode);
        let mut display = ViewDisplayRecord::with_sections(key.clone(), 2);
        for section in &mut display.sections {
            section.layout_id = "layout_onecol".to_string();
        }
        if mode == "full" {
            display.sections[1] = LayoutSection {
                layout_id: "layout_onecol".to_string(),
                components: vec![tags_block(&key)],
            };
        }
        host.save_view_display(display)?;
    }
    Ok(())
}

fn tags_block(key: &DisplayKey) -> SectionComponent {
    let id = block_id(KIND, TEMPLATE, "field_tags");
    let mut context_mapping = IndexMap::new();
    context_mapping.insert("entity".to_string(), "layout_builder.entity".to_string());
    SectionComponent {
        uuid: component_uuid(key, &id),
        region: "content".to_string(),
        weight: 20,
        configuration: BlockConfiguration {
            id,
            label: "Tags".to_string(),
            provider: "layout_builder".to_string(),
            label_display: "0".to_string(),
            context_mapping,
            formatter: FormatterConfig {
                label: LabelPosition::Above,
                formatter: "entity_reference_label".to_string(),
                settings: json!({ "link": true }),
            },
        },
    }
}

/// Register the form and view modes a config directory host lists
pub fn write_mode_files(root: &Path) -> std::io::Result<()> {
    for mode in VIEW_MODES {
        fs::write(
            root.join(format!("core.entity_view_mode.{KIND}.{mode}.yml")),
            format!("id: {KIND}.{mode}\nlabel: {mode}\n"),
        )?;
    }
    Ok(())
}

/// Everything a host holds for `bundles`, serialized for comparison
pub fn host_snapshot<H: ContentHost>(host: &H, bundles: &[&str]) -> Value {
    let mut snapshot = serde_json::Map::new();
    for bundle in bundles {
        let instances = host
            .list_field_instances(KIND, bundle)
            .expect("list field instances");
        let storages: Vec<Option<FieldStorageRecord>> = instances
            .iter()
            .map(|instance| {
                host.load_field_storage(KIND, &instance.field_name)
                    .expect("load field storage")
            })
            .collect();
        let form = host
            .load_form_display(&DisplayKey::new(KIND, *bundle, "default"))
            .expect("load form display");
        let views: Vec<Option<ViewDisplayRecord>> = std::iter::once("default")
            .chain(VIEW_MODES.iter().copied())
            .map(|mode| {
                host.load_view_display(&DisplayKey::new(KIND, *bundle, mode))
                    .expect("load view display")
            })
            .collect();

        snapshot.insert(
            (*bundle).to_string(),
            json!({
                "type": host.load_type(bundle).expect("load type"),
                "instances": instances,
                "storages": storages,
                "form": form,
                "views": views,
            }),
        );
    }
    Value::Object(snapshot)
}
