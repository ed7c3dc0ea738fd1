//! # Content Model Service
//!
//! Reads a content model from a spreadsheet and provisions it into a CMS
//! content host: content types cloned from a template, field storage, field
//! instances, form widgets and layout placements.
//!
//! ## Overview
//!
//! - **Extraction**: [`sheet::ModelExtractor`] scans the `Fields` sheet and
//!   returns every content type with its fields, or every malformed row at
//!   once
//! - **Field kinds**: [`kinds::FieldKindRegistry`] maps sheet type tags to
//!   storage types, widgets and per-context formatters
//! - **Provisioning**: [`provision::Provisioner`] applies definitions through
//!   the [`ContentHost`](content_model_core::ContentHost) trait as idempotent
//!   upserts, one transaction per content type
//! - **Hosts**: [`host::InMemoryHost`] and [`host::ConfigDirectoryHost`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use content_model_core::config::ContentModelConfig;
//! use content_model_service::host::ConfigDirectoryHost;
//! use content_model_service::kinds::FieldKindRegistry;
//! use content_model_service::provision::Provisioner;
//! use content_model_service::sheet::ModelExtractor;
//! use std::path::Path;
//!
//! fn main() -> content_model_core::Result<()> {
//!     let config = ContentModelConfig::default();
//!     let extractor = ModelExtractor::new(config.workbook.clone());
//!     let sheet = extractor.open_sheet(Path::new("content-model.xlsx"))?;
//!     let model = extractor.extract_model(&sheet)?;
//!
//!     let mut host = ConfigDirectoryHost::open("config/sync", "node")?;
//!     let mut provisioner =
//!         Provisioner::new(&mut host, config.provisioner, FieldKindRegistry::builtin());
//!     let outcome = provisioner.apply_type(model.get("article")?)?;
//!     println!("{} fields provisioned", outcome.fields.len());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)] // subjective determination
#![allow(clippy::cast_possible_truncation)] // row and column indices are bounded by the sheet
#![allow(clippy::doc_markdown)] // YAML, UUID, etc. are proper nouns

/// Command-line interface
pub mod cli;

/// Configuration loading
pub mod config;

/// Content hosts
pub mod host;

/// Field kind registry
pub mod kinds;

/// Provisioning
pub mod provision;

/// Content model sheet reading
pub mod sheet;

pub use host::{ConfigDirectoryHost, InMemoryHost};
pub use kinds::{FieldKindMapping, FieldKindRegistry};
pub use provision::{ApplyMode, ApplyReport, Provisioner};
pub use sheet::ModelExtractor;
