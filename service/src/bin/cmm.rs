//! `cmm` binary: content model provisioning tools

use content_model_core::error::Result;
use content_model_service::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
