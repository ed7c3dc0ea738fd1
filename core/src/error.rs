//! Error types for content model operations

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single malformed row found while extracting the content model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    /// 1-based sheet row
    pub row: u32,
    /// Column letter the issue was found in, if it is tied to one cell
    pub column: Option<char>,
    /// Human-readable description
    pub message: String,
}

impl RowIssue {
    /// Create an issue tied to a single cell
    #[must_use]
    pub fn at(row: u32, column: char, message: impl Into<String>) -> Self {
        Self {
            row,
            column: Some(column),
            message: message.into(),
        }
    }

    /// Create an issue that concerns the whole row
    #[must_use]
    pub fn row(row: u32, message: impl Into<String>) -> Self {
        Self {
            row,
            column: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => write!(f, "{column}{}: {}", self.row, self.message),
            None => write!(f, "row {}: {}", self.row, self.message),
        }
    }
}

/// Main error type for content model operations
#[derive(Error, Debug)]
pub enum ContentModelError {
    /// The sheet has one or more malformed rows. All of them are reported at once.
    #[error("Content model sheet has {} malformed row(s): {}", .issues.len(), summarize(.issues))]
    InvalidSheet {
        /// Every issue found during the extraction pass
        issues: Vec<RowIssue>,
    },

    /// A single value could not be parsed
    #[error("Failed to parse {what}: {message}")]
    ParseError {
        /// What was being parsed (e.g. "reference tag")
        what: String,
        /// Error message
        message: String,
    },

    /// No field kind mapping exists for a type tag
    #[error("No field kind mapping for type tag '{tag}' (field '{field}')")]
    UnknownFieldKind {
        /// Field that carries the tag
        field: String,
        /// The unmapped type tag
        tag: String,
    },

    /// A field kind has no formatter for a presentation context
    #[error("Field kind '{kind}' has no formatter for presentation context '{context}'")]
    UnknownContext {
        /// Field kind tag
        kind: String,
        /// Requested context
        context: String,
    },

    /// A content type was requested that the model does not define
    #[error("Content type '{0}' is not defined in the content model")]
    UnknownContentType(String),

    /// The template a type is cloned from does not exist on the host
    #[error("Template content type '{name}' does not exist on the host")]
    TemplateNotFound {
        /// Template type name
        name: String,
    },

    /// The host rejected an operation
    #[error("Host API rejected {operation}: {message}")]
    HostApi {
        /// Operation that failed (e.g. "save field storage node.field_title")
        operation: String,
        /// Error message
        message: String,
    },

    /// Workbook could not be opened or the sheet could not be read
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for content model operations
pub type Result<T> = std::result::Result<T, ContentModelError>;

fn summarize(issues: &[RowIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ContentModelError {
    /// Create a new parse error
    #[must_use]
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create an unknown field kind error
    #[must_use]
    pub fn unknown_kind(field: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::UnknownFieldKind {
            field: field.into(),
            tag: tag.into(),
        }
    }

    /// Create an unknown context error
    #[must_use]
    pub fn unknown_context(kind: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownContext {
            kind: kind.into(),
            context: context.into(),
        }
    }

    /// Create a host API error
    #[must_use]
    pub fn host_api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HostApi {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a workbook error
    #[must_use]
    pub fn workbook(message: impl Into<String>) -> Self {
        Self::Workbook(message.into())
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError(message.into())
    }

    /// Create an IO error from a message
    #[must_use]
    pub fn io_error(message: impl Into<String>) -> Self {
        Self::IoError(std::io::Error::other(message.into()))
    }

    /// Whether this error only affects a single field and provisioning can
    /// carry on with the rest of the type.
    #[must_use]
    pub fn is_field_local(&self) -> bool {
        matches!(
            self,
            Self::UnknownFieldKind { .. } | Self::UnknownContext { .. } | Self::ParseError { .. }
        )
    }
}

impl From<serde_json::Error> for ContentModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ContentModelError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
