//! # Content Model Core
//!
//! Core types and traits for provisioning a spreadsheet-defined content model
//! into a CMS host.
//!
//! This crate holds the pieces every other part of the workspace shares:
//! the definition records the extractor produces, the host-side records the
//! provisioner writes, the [`ContentHost`] trait a host implements, the
//! configuration structs and the error taxonomy.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Core error types
pub mod error;

/// Definition records extracted from the sheet
pub mod types;

/// Records persisted by a content host
pub mod records;

/// Host API trait
pub mod traits;

/// Extraction and provisioning configuration
pub mod config;

// Re-export commonly used types
pub use config::{ContentModelConfig, ProvisionerConfig, ViewPlacement, WorkbookConfig};
pub use error::{ContentModelError, Result, RowIssue};
pub use traits::ContentHost;
pub use types::{
    ContentModel, ContentTypeDefinition, ContentTypeSchema, FieldDefinition, FieldGroup,
    FormatterConfig, LabelPosition, ReferenceTarget, WidgetConfig,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ContentModelConfig, ProvisionerConfig, WorkbookConfig};
    pub use crate::error::{ContentModelError, Result, RowIssue};
    pub use crate::records::*;
    pub use crate::traits::ContentHost;
    pub use crate::types::*;
}
