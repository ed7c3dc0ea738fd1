//! Results of provisioning runs

use serde::Serialize;
use uuid::Uuid;

/// A content type as saved on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeHandle {
    /// Machine name
    pub id: String,
    /// Identity on the host
    pub uuid: Uuid,
    /// Whether this run created the type
    pub created: bool,
}

/// One view placement made for a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementOutcome {
    /// View mode
    pub context: String,
    /// Layout section index
    pub section: usize,
    /// Region inside the section
    pub region: String,
    /// Weight the block was given
    pub weight: i64,
    /// Whether the block was appended rather than updated
    pub created: bool,
}

/// A field as saved on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldHandle {
    /// Entity kind
    pub entity_kind: String,
    /// Bundle
    pub bundle: String,
    /// Field machine name
    pub field_name: String,
    /// Storage type
    pub storage_type: String,
    /// Identity of the field storage
    pub storage_uuid: Uuid,
    /// Identity of the field instance
    pub instance_uuid: Uuid,
    /// Whether this run created the field instance
    pub created: bool,
    /// View placements, in placement order
    pub placements: Vec<PlacementOutcome>,
}

/// A field left out of a run because of a field-local error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedField {
    /// Field machine name
    pub field: String,
    /// Sheet row of the field
    pub row: u32,
    /// Why it was skipped
    pub reason: String,
}

/// What happened to one content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeOutcome {
    /// Content type name
    pub name: String,
    /// The saved type, when the run touched the type itself
    pub handle: Option<TypeHandle>,
    /// Fields provisioned
    pub fields: Vec<FieldHandle>,
    /// Fields skipped
    pub skipped: Vec<SkippedField>,
}

impl TypeOutcome {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: None,
            fields: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Outcome of one deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDeletion {
    /// Content type name
    pub name: String,
    /// `false` if the type was not on the host
    pub deleted: bool,
}

/// Report of a provisioning run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// One entry per content type, in run order
    pub types: Vec<TypeOutcome>,
}

impl ApplyReport {
    /// Number of fields provisioned across all types
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.types.iter().map(|t| t.fields.len()).sum()
    }

    /// Every skipped field, with the type it belongs to
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkippedField)> {
        self.types
            .iter()
            .flat_map(|t| t.skipped.iter().map(move |s| (t.name.as_str(), s)))
    }

    /// Whether every field was provisioned
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped().next().is_none()
    }
}
