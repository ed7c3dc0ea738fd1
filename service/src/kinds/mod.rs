//! Field kind registry
//!
//! Maps a sheet type tag to the storage type, widget and per-context
//! formatters used when the field is provisioned. The table is data: adding a
//! kind means adding a row in [`builtin`], not a new type.

pub mod builtin;

use content_model_core::config::ProvisionerConfig;
use content_model_core::error::{ContentModelError, Result};
use content_model_core::types::{FieldDefinition, FormatterConfig, REFERENCE_PREFIX, WidgetConfig};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Tag every `ref@...` type tag resolves to
pub const REFERENCE_KIND: &str = "Entity reference";

/// Which formatter a presentation context uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextClass {
    /// Full page rendering
    Default,
    /// Listings and teasers
    Secondary,
    /// Search index rendering
    Index,
}

impl ContextClass {
    /// Class of a named presentation context
    #[must_use]
    pub fn of(context: &str) -> Option<Self> {
        match context {
            "full" => Some(Self::Default),
            "search" | "summary" | "teaser" | "teaser_inline" => Some(Self::Secondary),
            "search_index" => Some(Self::Index),
            _ => None,
        }
    }
}

/// Formatter per context class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatterSet {
    /// `full`
    pub default: FormatterConfig,
    /// `search`, `summary`, `teaser`, `teaser_inline`
    pub secondary: FormatterConfig,
    /// `search_index`
    pub index: FormatterConfig,
}

impl FormatterSet {
    fn get(&self, class: ContextClass) -> &FormatterConfig {
        match class {
            ContextClass::Default => &self.default,
            ContextClass::Secondary => &self.secondary,
            ContextClass::Index => &self.index,
        }
    }
}

/// How a kind derives storage and instance settings from a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsProfile {
    /// No settings
    Plain,
    /// Date-only datetime storage
    Date,
    /// Entity reference to the target named in the type tag
    Reference,
    /// Select list with allowed values from the provisioner config
    AllowedValues,
}

/// One row of the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldKindMapping {
    /// Type tag as written in column H
    pub tag: String,
    /// Field storage type
    pub storage_type: String,
    /// Form widget
    pub widget: WidgetConfig,
    /// Formatters per context class
    pub formatters: FormatterSet,
    /// Settings derivation
    pub settings: SettingsProfile,
}

impl FieldKindMapping {
    /// Formatter configuration for a named presentation context
    ///
    /// # Errors
    ///
    /// Returns `UnknownContext` if the context is not one of the known view modes.
    pub fn resolve_config(&self, context: &str) -> Result<FormatterConfig> {
        ContextClass::of(context)
            .map(|class| self.formatters.get(class).clone())
            .ok_or_else(|| ContentModelError::unknown_context(&self.tag, context))
    }

    /// Field storage settings for a field of this kind
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if a reference field has a malformed type tag or a
    /// list field resolves to no allowed values.
    pub fn storage_settings(
        &self,
        field: &FieldDefinition,
        config: &ProvisionerConfig,
    ) -> Result<Value> {
        Ok(match self.settings {
            SettingsProfile::Plain => json!({}),
            SettingsProfile::Date => json!({ "datetime_type": "date" }),
            SettingsProfile::Reference => {
                let target = field.reference_target()?;
                json!({ "target_type": target.entity_type })
            }
            SettingsProfile::AllowedValues => {
                let values = config.allowed_values_for(&field.name);
                if values.is_empty() {
                    return Err(ContentModelError::parse(
                        "allowed values",
                        format!("list field '{}' resolves to an empty value set", field.name),
                    ));
                }
                json!({ "allowed_values": values })
            }
        })
    }

    /// Field instance settings for a field of this kind
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if a reference field has a malformed type tag.
    pub fn instance_settings(&self, field: &FieldDefinition) -> Result<Value> {
        if self.settings != SettingsProfile::Reference {
            return Ok(json!({}));
        }

        let target = field.reference_target()?;
        let mut handler_settings = json!({
            "target_bundles": { target.bundle.as_str(): target.bundle.as_str() },
            "sort": { "field": "_none" },
            "auto_create": false,
        });
        if target.entity_type == "media" {
            handler_settings["auto_create_bundle"] = Value::from(target.bundle.as_str());
        }

        Ok(json!({
            "handler": format!("default:{}", target.entity_type),
            "handler_settings": handler_settings,
        }))
    }
}

/// Registry of field kinds keyed by type tag
#[derive(Debug, Clone, Default)]
pub struct FieldKindRegistry {
    kinds: IndexMap<String, FieldKindMapping>,
}

impl FieldKindRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in kind
    #[must_use]
    pub fn builtin() -> Self {
        builtin::BUILTIN_KINDS.clone()
    }

    /// Add or replace a kind
    pub fn register(&mut self, mapping: FieldKindMapping) {
        self.kinds.insert(mapping.tag.clone(), mapping);
    }

    /// Mapping for a field's type tag. Reference tags resolve to
    /// [`REFERENCE_KIND`] whatever their target.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFieldKind` if no mapping matches.
    pub fn resolve(&self, field: &FieldDefinition) -> Result<&FieldKindMapping> {
        let tag = if field.type_tag.starts_with(REFERENCE_PREFIX) {
            REFERENCE_KIND
        } else {
            field.type_tag.as_str()
        };
        self.kinds
            .get(tag)
            .ok_or_else(|| ContentModelError::unknown_kind(&field.name, &field.type_tag))
    }

    /// Registered tags in registration order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Number of registered kinds
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_model_core::types::{FieldGroup, LabelPosition};
    use pretty_assertions::assert_eq;

    fn field(name: &str, tag: &str) -> FieldDefinition {
        FieldDefinition {
            name: name.to_string(),
            label: name.to_string(),
            description: String::new(),
            type_tag: tag.to_string(),
            required: false,
            cardinality: 1,
            weight: 5,
            group: FieldGroup::Content,
            source_row: 5,
        }
    }

    #[test]
    fn test_reference_tags_resolve_to_entity_reference() {
        let registry = FieldKindRegistry::builtin();
        let mapping = registry.resolve(&field("field_image", "ref@media/image")).unwrap();
        assert_eq!(mapping.tag, REFERENCE_KIND);
        assert_eq!(mapping.storage_type, "entity_reference");
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let registry = FieldKindRegistry::builtin();
        let err = registry.resolve(&field("field_geo", "Geolocation")).unwrap_err();
        assert!(matches!(
            err,
            ContentModelError::UnknownFieldKind { ref field, ref tag }
                if field == "field_geo" && tag == "Geolocation"
        ));
    }

    #[test]
    fn test_resolve_config_by_context() {
        let registry = FieldKindRegistry::builtin();
        let text = registry.resolve(&field("field_title", "Text (255)")).unwrap();

        let full = text.resolve_config("full").unwrap();
        assert_eq!(full.formatter, "string");
        assert_eq!(full.label, LabelPosition::Inline);

        let teaser = text.resolve_config("teaser").unwrap();
        assert_eq!(teaser.label, LabelPosition::Hidden);

        assert!(matches!(
            text.resolve_config("rss"),
            Err(ContentModelError::UnknownContext { .. })
        ));
    }

    #[test]
    fn test_reference_settings() {
        let registry = FieldKindRegistry::builtin();
        let image = field("field_image", "ref@media/image");
        let mapping = registry.resolve(&image).unwrap();

        let storage = mapping
            .storage_settings(&image, &ProvisionerConfig::default())
            .unwrap();
        assert_eq!(storage, json!({ "target_type": "media" }));

        let instance = mapping.instance_settings(&image).unwrap();
        assert_eq!(instance["handler"], "default:media");
        assert_eq!(instance["handler_settings"]["target_bundles"]["image"], "image");
        assert_eq!(instance["handler_settings"]["auto_create_bundle"], "image");

        let tags = field("field_tags", "ref@taxonomy_term/tags");
        let instance = mapping.instance_settings(&tags).unwrap();
        assert!(instance["handler_settings"].get("auto_create_bundle").is_none());
    }

    #[test]
    fn test_allowed_values_come_from_config() {
        let registry = FieldKindRegistry::builtin();
        let product = field("field_product_type", "List (text)");
        let mut config = ProvisionerConfig::default();
        config.allowed_values.insert(
            "field_product_type".to_string(),
            [("medicine".to_string(), "Medicine".to_string())]
                .into_iter()
                .collect(),
        );

        let mapping = registry.resolve(&product).unwrap();
        let settings = mapping.storage_settings(&product, &config).unwrap();
        assert_eq!(settings["allowed_values"]["medicine"], "Medicine");
        assert_eq!(settings["allowed_values"].as_object().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_allowed_values_default_to_product_types() {
        let registry = FieldKindRegistry::builtin();
        let product = field("field_product_type", "List (text)");
        let mapping = registry.resolve(&product).unwrap();

        let settings = mapping
            .storage_settings(&product, &ProvisionerConfig::default())
            .unwrap();
        let values = settings["allowed_values"].as_object().unwrap();
        assert_eq!(values.len(), 9);
        assert_eq!(values["blood-tissues-bio"], "Blood, tissues, and biologicals");
    }

    #[test]
    fn test_empty_allowed_values_rejected() {
        let registry = FieldKindRegistry::builtin();
        let product = field("field_product_type", "List (text)");
        let mut config = ProvisionerConfig::default();
        config.default_allowed_values.clear();

        let mapping = registry.resolve(&product).unwrap();
        let err = mapping.storage_settings(&product, &config).unwrap_err();
        assert!(matches!(err, ContentModelError::ParseError { .. }));
        assert!(err.is_field_local());
        assert!(err.to_string().contains("field_product_type"));
    }

    #[test]
    fn test_context_classes() {
        assert_eq!(ContextClass::of("full"), Some(ContextClass::Default));
        assert_eq!(ContextClass::of("teaser_inline"), Some(ContextClass::Secondary));
        assert_eq!(ContextClass::of("search_index"), Some(ContextClass::Index));
        assert_eq!(ContextClass::of("default"), None);
    }
}
