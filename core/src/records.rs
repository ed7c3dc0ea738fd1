//! Host-side records
//!
//! These mirror the objects a content host persists: content types, field
//! storage, field instances and form/view displays. A record with
//! `uuid: None` has never been saved; hosts assign the uuid on first save and
//! the provisioner carries it forward on every update.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::types::{FormatterConfig, WidgetConfig};

/// A content type (bundle) on the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeRecord {
    /// Machine name
    pub id: String,
    /// Stable identity
    #[serde(default)]
    pub uuid: Option<Uuid>,
    /// Human-readable label
    pub label: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Remaining type properties, copied verbatim from the template
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
}

/// Field storage: shared by every bundle of an entity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStorageRecord {
    /// Entity kind, e.g. `node`
    pub entity_kind: String,
    /// Field machine name
    pub field_name: String,
    /// Stable identity
    #[serde(default)]
    pub uuid: Option<Uuid>,
    /// Storage type, e.g. `string`
    pub field_type: String,
    /// Values allowed, `-1` for unlimited
    pub cardinality: i32,
    /// Storage settings
    #[serde(default)]
    pub settings: Value,
}

impl FieldStorageRecord {
    /// `kind.field` identifier
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}.{}", self.entity_kind, self.field_name)
    }
}

/// A field attached to a specific bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInstanceRecord {
    /// Entity kind, e.g. `node`
    pub entity_kind: String,
    /// Bundle the field is attached to
    pub bundle: String,
    /// Field machine name
    pub field_name: String,
    /// Stable identity
    #[serde(default)]
    pub uuid: Option<Uuid>,
    /// Storage type, copied from the field storage
    pub field_type: String,
    /// Label shown to editors
    pub label: String,
    /// Help text
    #[serde(default)]
    pub description: String,
    /// Whether a value is required
    #[serde(default)]
    pub required: bool,
    /// Instance settings
    #[serde(default)]
    pub settings: Value,
}

impl FieldInstanceRecord {
    /// `kind.bundle.field` identifier
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}.{}.{}", self.entity_kind, self.bundle, self.field_name)
    }
}

/// Address of a form or view display: `entityKind.bundle.mode`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisplayKey {
    /// Entity kind, e.g. `node`
    pub entity_kind: String,
    /// Bundle
    pub bundle: String,
    /// Form mode or view mode
    pub mode: String,
}

impl DisplayKey {
    /// Build a display key
    #[must_use]
    pub fn new(
        entity_kind: impl Into<String>,
        bundle: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            bundle: bundle.into(),
            mode: mode.into(),
        }
    }

    /// Same kind and mode, different bundle
    #[must_use]
    pub fn with_bundle(&self, bundle: impl Into<String>) -> Self {
        Self {
            entity_kind: self.entity_kind.clone(),
            bundle: bundle.into(),
            mode: self.mode.clone(),
        }
    }
}

impl fmt::Display for DisplayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.entity_kind, self.bundle, self.mode)
    }
}

/// A widget placed on a form display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetComponent {
    /// Widget type and settings
    #[serde(flatten)]
    pub widget: WidgetConfig,
    /// Ordering
    pub weight: i64,
}

/// Settings of a `group_<name>` field group on a form display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldGroupSettings {
    /// Field names in the group, in insertion order
    #[serde(default)]
    pub children: Vec<String>,
    /// Anything else the group carries (label, format type, ...)
    #[serde(default, flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Form display for one bundle and form mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDisplayRecord {
    /// Address
    pub key: DisplayKey,
    /// Stable identity
    #[serde(default)]
    pub uuid: Option<Uuid>,
    /// Widgets keyed by field name
    #[serde(default)]
    pub components: IndexMap<String, WidgetComponent>,
    /// Field groups keyed by group id (`group_meta`, ...)
    #[serde(default)]
    pub field_groups: IndexMap<String, FieldGroupSettings>,
}

impl FormDisplayRecord {
    /// Empty display
    #[must_use]
    pub fn new(key: DisplayKey) -> Self {
        Self {
            key,
            uuid: None,
            components: IndexMap::new(),
            field_groups: IndexMap::new(),
        }
    }
}

/// Configuration of a field block inside a layout section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfiguration {
    /// Block id, `field_block:<kind>:<bundle>:<field>`
    pub id: String,
    /// Block label
    pub label: String,
    /// Module providing the block
    pub provider: String,
    /// Whether the block title is shown
    pub label_display: String,
    /// Context wiring
    #[serde(default)]
    pub context_mapping: IndexMap<String, String>,
    /// Field formatter
    pub formatter: FormatterConfig,
}

/// A block placed in a layout section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionComponent {
    /// Component identity
    pub uuid: Uuid,
    /// Region inside the section
    pub region: String,
    /// Ordering inside the region
    pub weight: i64,
    /// Block configuration
    pub configuration: BlockConfiguration,
}

/// One section of a layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSection {
    /// Layout plugin id, e.g. `layout_onecol`
    #[serde(default)]
    pub layout_id: String,
    /// Components in placement order
    #[serde(default)]
    pub components: Vec<SectionComponent>,
}

impl LayoutSection {
    /// Find a component by block id
    pub fn component_mut(&mut self, block_id: &str) -> Option<&mut SectionComponent> {
        self.components
            .iter_mut()
            .find(|component| component.configuration.id == block_id)
    }
}

/// View display for one bundle and view mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDisplayRecord {
    /// Address
    pub key: DisplayKey,
    /// Stable identity
    #[serde(default)]
    pub uuid: Option<Uuid>,
    /// Layout sections
    #[serde(default)]
    pub sections: Vec<LayoutSection>,
}

impl ViewDisplayRecord {
    /// Display with `section_count` empty sections
    #[must_use]
    pub fn with_sections(key: DisplayKey, section_count: usize) -> Self {
        Self {
            key,
            uuid: None,
            sections: vec![LayoutSection::default(); section_count],
        }
    }
}
