//! Command-line interface for the content model tools.
//!
//! Each subcommand also answers to a short alias
//! (`cmsf`, `cmct`, `cmctwf`, `cmdt`, `cmctf`, `cmv`, `cmr`).

mod app;
mod types;

pub use app::ContentModelApp;
pub use types::{ContentModelCli, ContentModelCommand, OutputFormat};

/// Main entry point for the CLI
///
/// # Errors
/// Returns error if CLI execution fails or encounters invalid arguments.
pub async fn run() -> content_model_core::error::Result<()> {
    ContentModelApp::from_args().run().await
}
