//! CLI type definitions and enums

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Content model command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "cmm",
    version,
    about = "Provision a spreadsheet content model into a CMS configuration"
)]
pub struct ContentModelCli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to $CMM_CONFIG, then config/default.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Content model workbook (overrides `workbook.path`)
    #[arg(short, long, global = true)]
    pub workbook: Option<PathBuf>,

    /// Sheet holding the content model (overrides `workbook.sheet_name`)
    #[arg(long, global = true)]
    pub sheet: Option<String>,

    /// Configuration directory to provision into
    #[arg(short, long, global = true)]
    pub target: Option<PathBuf>,

    /// Compute every change but write nothing
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Output format
    #[arg(short = 'f', long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: ContentModelCommand,
}

/// Output formats for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Content model subcommands
#[derive(Subcommand, Debug)]
pub enum ContentModelCommand {
    /// List the fields declared for a content type
    #[command(alias = "cmsf")]
    ShowFields {
        /// Content type machine name
        content_type: String,
    },

    /// Create or update content types from their templates
    #[command(alias = "cmct")]
    CreateType {
        /// Comma-separated content type names
        #[arg(value_delimiter = ',', required = true)]
        types: Vec<String>,
    },

    /// Create or update content types and all their fields
    #[command(alias = "cmctwf")]
    CreateTypeWithFields {
        /// Comma-separated content type names
        #[arg(value_delimiter = ',', required = true)]
        types: Vec<String>,
    },

    /// Delete content types
    #[command(alias = "cmdt")]
    DeleteTypes {
        /// Comma-separated content type names
        #[arg(value_delimiter = ',', required = true)]
        types: Vec<String>,
    },

    /// Create or update the fields of existing content types
    #[command(alias = "cmctf")]
    CreateTypeFields {
        /// Comma-separated content type names
        #[arg(value_delimiter = ',', required = true)]
        types: Vec<String>,
    },

    /// Check every field against the field kind registry
    #[command(alias = "cmv")]
    Validate,

    /// Dump every content type with its fields
    #[command(alias = "cmr")]
    Report,
}
