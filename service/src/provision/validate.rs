//! Dry validation of a content model against the field kind registry

use crate::kinds::FieldKindRegistry;
use content_model_core::config::ProvisionerConfig;
use content_model_core::error::{ContentModelError, Result, RowIssue};
use content_model_core::types::{ContentModel, FieldDefinition};
use serde::Serialize;

/// The first problem found for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Content type the field belongs to
    pub content_type: String,
    /// Field machine name
    pub field: String,
    /// Sheet row of the field
    pub row: u32,
    /// Type tag from the sheet
    pub type_tag: String,
    /// Sheet column the problem comes from, if it is tied to one cell
    pub column: Option<char>,
    /// What is wrong
    pub message: String,
}

impl FieldIssue {
    /// The issue as a sheet row issue
    #[must_use]
    pub fn to_row_issue(&self) -> RowIssue {
        match self.column {
            Some(column) => RowIssue::at(self.row, column, &self.message),
            None => RowIssue::row(self.row, &self.message),
        }
    }
}

/// Result of validating a whole model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Number of fields checked
    pub checked: usize,
    /// At most one issue per field
    pub issues: Vec<FieldIssue>,
}

impl ValidationReport {
    /// Whether every field would provision
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check every field of `model` the way the provisioner would resolve it,
/// without touching a host. Only the first error per field is reported.
#[must_use]
pub fn validate_model(
    model: &ContentModel,
    kinds: &FieldKindRegistry,
    config: &ProvisionerConfig,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for schema in model.types.values() {
        for field in &schema.fields {
            report.checked += 1;
            if let Err(e) = check_field(field, kinds, config) {
                report.issues.push(FieldIssue {
                    content_type: schema.definition.name.clone(),
                    field: field.name.clone(),
                    row: field.source_row,
                    type_tag: field.type_tag.clone(),
                    column: tag_column(&e),
                    message: e.to_string(),
                });
            }
        }
    }

    report
}

/// Unmapped and malformed type tags point at column H; everything else comes
/// from configuration.
fn tag_column(error: &ContentModelError) -> Option<char> {
    match error {
        ContentModelError::UnknownFieldKind { .. } => Some('H'),
        ContentModelError::ParseError { what, .. } if what == "reference tag" => Some('H'),
        _ => None,
    }
}

fn check_field(
    field: &FieldDefinition,
    kinds: &FieldKindRegistry,
    config: &ProvisionerConfig,
) -> Result<()> {
    let mapping = kinds.resolve(field)?;
    mapping.storage_settings(field, config)?;
    mapping.instance_settings(field)?;
    for placement in config.placements_for(&field.name) {
        mapping.resolve_config(&placement.context)?;
    }
    Ok(())
}
