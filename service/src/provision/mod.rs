//! Provisioning of content models into a content host

pub mod placement;
pub mod provisioner;
pub mod report;
pub mod validate;

pub use provisioner::{ApplyMode, Provisioner};
pub use report::{
    ApplyReport, FieldHandle, PlacementOutcome, SkippedField, TypeDeletion, TypeHandle,
    TypeOutcome,
};
pub use validate::{FieldIssue, ValidationReport, validate_model};
