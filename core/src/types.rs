//! Definition records extracted from the content model sheet
//!
//! These are the in-memory records the extractor produces and the
//! provisioner consumes. They are built fresh on every run and dropped once
//! the run completes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{ContentModelError, Result};

/// Prefix that marks a reference type tag (`ref@entityType/bundle`)
pub const REFERENCE_PREFIX: &str = "ref@";

/// Cardinality value meaning "any number of values"
pub const UNLIMITED_CARDINALITY: i32 = -1;

/// A content type as declared by a `Node` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeDefinition {
    /// Machine name, unique across the sheet
    pub name: String,
    /// Human-readable label
    pub label: String,
    /// Description, empty when the sheet holds a placeholder
    pub description: String,
    /// Template type this type is cloned from
    pub base_type: String,
    /// 1-based row of the `Node` marker
    pub source_row: u32,
}

/// A field as declared by a `Field` row beneath a content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field machine name
    pub name: String,
    /// Human-readable label
    pub label: String,
    /// Help text
    pub description: String,
    /// Raw type string from column H, e.g. `Text (255)` or `ref@media/image`
    pub type_tag: String,
    /// Whether a value is required
    pub required: bool,
    /// Number of values allowed; [`UNLIMITED_CARDINALITY`] for unbounded
    pub cardinality: i32,
    /// Display ordering
    pub weight: i64,
    /// Form group the widget belongs to
    pub group: FieldGroup,
    /// 1-based row of the `Field` marker
    pub source_row: u32,
}

impl FieldDefinition {
    /// Whether the type tag points at another entity
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.type_tag.starts_with(REFERENCE_PREFIX)
    }

    /// Parse the reference target out of the type tag
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the tag is not a well-formed reference tag.
    pub fn reference_target(&self) -> Result<ReferenceTarget> {
        self.type_tag.parse()
    }
}

/// Form group a field widget is placed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldGroup {
    /// Metadata fields
    Meta,
    /// Main body fields
    #[default]
    Content,
    /// Downloadable attachments
    Attach,
}

impl FieldGroup {
    /// Group machine name, as used in `group_<name>`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Content => "content",
            Self::Attach => "attach",
        }
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of a reference field: `ref@<entity_type>/<bundle>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTarget {
    /// Referenced entity type, e.g. `media`
    pub entity_type: String,
    /// Referenced bundle, e.g. `image`
    pub bundle: String,
}

impl FromStr for ReferenceTarget {
    type Err = ContentModelError;

    fn from_str(tag: &str) -> Result<Self> {
        let definition = tag.strip_prefix(REFERENCE_PREFIX).ok_or_else(|| {
            ContentModelError::parse(
                "reference tag",
                format!("'{tag}' does not start with '{REFERENCE_PREFIX}'"),
            )
        })?;

        let (entity_type, bundle) = definition.split_once('/').ok_or_else(|| {
            ContentModelError::parse(
                "reference tag",
                format!("'{tag}' has no '/' between entity type and bundle"),
            )
        })?;

        if bundle.contains('/') {
            return Err(ContentModelError::parse(
                "reference tag",
                format!("'{tag}' has more than one '/'"),
            ));
        }

        let entity_type = entity_type.trim();
        let bundle = bundle.trim();
        if entity_type.is_empty() || bundle.is_empty() {
            return Err(ContentModelError::parse(
                "reference tag",
                format!("'{tag}' must name both an entity type and a bundle"),
            ));
        }

        Ok(Self {
            entity_type: entity_type.to_string(),
            bundle: bundle.to_string(),
        })
    }
}

/// A content type together with the fields declared beneath it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeSchema {
    /// The type itself
    #[serde(flatten)]
    pub definition: ContentTypeDefinition,
    /// Fields in sheet order
    pub fields: Vec<FieldDefinition>,
}

/// Every content type in the sheet, in sheet order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentModel {
    /// Types keyed by machine name
    pub types: IndexMap<String, ContentTypeSchema>,
}

impl ContentModel {
    /// Look up a type and its fields
    ///
    /// # Errors
    ///
    /// Returns `UnknownContentType` if the model does not define `name`.
    pub fn get(&self, name: &str) -> Result<&ContentTypeSchema> {
        self.types
            .get(name)
            .ok_or_else(|| ContentModelError::UnknownContentType(name.to_string()))
    }

    /// Number of fields across all types
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.types.values().map(|schema| schema.fields.len()).sum()
    }
}

/// Where a field label is rendered relative to its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    /// Label on its own line above the value
    Above,
    /// Label beside the value
    Inline,
    /// No label
    Hidden,
}

/// Formatter settings for one presentation context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// Label position
    pub label: LabelPosition,
    /// Formatter plugin id
    #[serde(rename = "type")]
    pub formatter: String,
    /// Formatter settings
    #[serde(default)]
    pub settings: Value,
}

/// Widget settings used in the form display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Widget plugin id
    #[serde(rename = "type")]
    pub widget: String,
    /// Widget settings
    #[serde(default)]
    pub settings: Value,
}
