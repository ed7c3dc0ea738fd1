//! Configuration types for content model extraction and provisioning
//!
//! Defaults reproduce the layout of the content model workbook and the
//! placement plan the provisioner applies when no config file is given.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ContentModelError, Result};
use crate::types::FieldGroup;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentModelConfig {
    /// Where and how to read the content model
    pub workbook: WorkbookConfig,

    /// How definitions are applied to the host
    pub provisioner: ProvisionerConfig,
}

impl ContentModelConfig {
    /// Check the configuration for values the extractor or provisioner cannot work with
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        self.workbook.validate()?;
        self.provisioner.validate()
    }
}

/// Workbook layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookConfig {
    /// Path of the workbook file
    pub path: Option<PathBuf>,

    /// Sheet holding type and field rows
    pub sheet_name: String,

    /// Last row scanned for type markers
    pub row_limit: u32,

    /// Column B value that opens a content type block
    pub type_marker: String,

    /// Column B value of a field row
    pub field_marker: String,

    /// Prefix stripped from type names in column C
    pub type_name_prefix: String,

    /// Description values treated as empty
    pub placeholder_descriptions: Vec<String>,

    /// Template used when a type row has no base type in column H
    pub default_base_type: String,

    /// Column A category -> form group
    pub category_groups: IndexMap<String, FieldGroup>,
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        let mut category_groups = IndexMap::new();
        category_groups.insert("Meta".to_string(), FieldGroup::Meta);
        category_groups.insert("Content".to_string(), FieldGroup::Content);
        category_groups.insert("Downloadable files".to_string(), FieldGroup::Attach);

        Self {
            path: None,
            sheet_name: "Fields".to_string(),
            row_limit: 599,
            type_marker: "Node".to_string(),
            field_marker: "Field".to_string(),
            type_name_prefix: "type: ".to_string(),
            placeholder_descriptions: vec!["DONE".to_string(), "TODO".to_string()],
            default_base_type: "base".to_string(),
            category_groups,
        }
    }
}

impl WorkbookConfig {
    /// Group for a column A category; unknown categories land in `content`
    #[must_use]
    pub fn group_for_category(&self, category: &str) -> FieldGroup {
        self.category_groups
            .get(category)
            .copied()
            .unwrap_or_default()
    }

    /// Whether a description cell only holds a placeholder
    #[must_use]
    pub fn is_placeholder(&self, description: &str) -> bool {
        self.placeholder_descriptions
            .iter()
            .any(|placeholder| placeholder == description)
    }

    fn validate(&self) -> Result<()> {
        if self.sheet_name.trim().is_empty() {
            return Err(ContentModelError::config("workbook.sheet_name must not be empty"));
        }
        if self.row_limit == 0 {
            return Err(ContentModelError::config("workbook.row_limit must be at least 1"));
        }
        if self.type_marker.is_empty() || self.field_marker.is_empty() {
            return Err(ContentModelError::config(
                "workbook.type_marker and workbook.field_marker must not be empty",
            ));
        }
        if self.type_marker == self.field_marker {
            return Err(ContentModelError::config(
                "workbook.type_marker and workbook.field_marker must differ",
            ));
        }
        if self.default_base_type.trim().is_empty() {
            return Err(ContentModelError::config(
                "workbook.default_base_type must not be empty",
            ));
        }
        Ok(())
    }
}

/// Placement of a field in one view display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPlacement {
    /// View mode, e.g. `full`
    pub context: String,

    /// Index of the layout section
    #[serde(default)]
    pub section: usize,

    /// Region inside the section
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "content".to_string()
}

impl ViewPlacement {
    /// Build a placement
    #[must_use]
    pub fn new(context: impl Into<String>, section: usize, region: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            section,
            region: region.into(),
        }
    }
}

/// Per-field replacement of the default placement plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPlacementOverride {
    /// Keep the field out of its form group
    #[serde(default)]
    pub skip_form_group: bool,

    /// View placements used instead of the defaults
    pub placements: Vec<ViewPlacement>,
}

/// Provisioner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Entity kind content types are bundles of
    pub entity_kind: String,

    /// Form mode fields are placed on
    pub form_mode: String,

    /// View placement weight of required fields
    pub required_weight: i64,

    /// View placements applied to every field
    pub placements: Vec<ViewPlacement>,

    /// Field name -> placement plan used instead of `placements`
    pub overrides: IndexMap<String, FieldPlacementOverride>,

    /// Allowed values (key -> label) of list fields without an entry in `allowed_values`
    pub default_allowed_values: IndexMap<String, String>,

    /// Field name -> allowed values (key -> label) of list fields
    pub allowed_values: IndexMap<String, IndexMap<String, String>>,
}

fn product_types() -> IndexMap<String, String> {
    [
        ("biological", "Biological"),
        ("blood-tissues-bio", "Blood, tissues, and biologicals"),
        ("listed-comp-medicines", "Listed complementary medicines"),
        ("medical-device", "Medical Device"),
        ("medicine", "Medicine"),
        ("other-therapeutic-good", "Other Therapeutic Good"),
        ("other-therapeutic-good-listed", "Other therapeutic goods listed"),
        ("over-the-counter-medicines", "Over-the-counter medicines"),
        ("prescription-medicines", "Prescription medicines"),
    ]
    .into_iter()
    .map(|(key, label)| (key.to_string(), label.to_string()))
    .collect()
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        let mut overrides = IndexMap::new();
        overrides.insert(
            "field_published_date".to_string(),
            FieldPlacementOverride {
                skip_form_group: true,
                placements: vec![
                    ViewPlacement::new("full", 1, "content"),
                    ViewPlacement::new("search", 0, "date"),
                    ViewPlacement::new("summary", 0, "date"),
                    ViewPlacement::new("teaser", 0, "date"),
                    ViewPlacement::new("teaser_inline", 0, "date"),
                ],
            },
        );

        Self {
            entity_kind: "node".to_string(),
            form_mode: "default".to_string(),
            required_weight: 1,
            placements: vec![
                ViewPlacement::new("full", 1, "content"),
                ViewPlacement::new("search_index", 0, "content"),
            ],
            overrides,
            default_allowed_values: product_types(),
            allowed_values: IndexMap::new(),
        }
    }
}

impl ProvisionerConfig {
    /// View placements for a field
    #[must_use]
    pub fn placements_for(&self, field_name: &str) -> &[ViewPlacement] {
        self.overrides
            .get(field_name)
            .map_or(self.placements.as_slice(), |o| o.placements.as_slice())
    }

    /// Allowed values of a list field; a per-field entry replaces the defaults
    #[must_use]
    pub fn allowed_values_for(&self, field_name: &str) -> &IndexMap<String, String> {
        self.allowed_values
            .get(field_name)
            .unwrap_or(&self.default_allowed_values)
    }

    /// Whether the field should join its form group
    #[must_use]
    pub fn uses_form_group(&self, field_name: &str) -> bool {
        self.overrides
            .get(field_name)
            .is_none_or(|o| !o.skip_form_group)
    }

    fn validate(&self) -> Result<()> {
        if self.entity_kind.trim().is_empty() {
            return Err(ContentModelError::config(
                "provisioner.entity_kind must not be empty",
            ));
        }
        if self.form_mode.trim().is_empty() {
            return Err(ContentModelError::config(
                "provisioner.form_mode must not be empty",
            ));
        }
        if self.placements.is_empty() {
            return Err(ContentModelError::config(
                "provisioner.placements must contain at least one view placement",
            ));
        }
        let plans = std::iter::once(("default plan", self.placements.as_slice())).chain(
            self.overrides
                .iter()
                .map(|(field, o)| (field.as_str(), o.placements.as_slice())),
        );
        for (owner, placements) in plans {
            if placements.iter().any(|p| p.context.trim().is_empty()) {
                return Err(ContentModelError::config(format!(
                    "provisioner placement in {owner} has an empty context"
                )));
            }
        }
        Ok(())
    }
}
