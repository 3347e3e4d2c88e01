//! # Flatmatch API Main Entry Point
//!
//! This is the main entry point for the flatmatch service.

use flatmatch::{config::ConfigLoader, db, server::run_server, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config)?;
    tracing::info!(profile = %config.profile, "loaded configuration");

    // Connect to the document store; bootstrap failure terminates the process
    let db = db::init_store(&config).await?;

    run_server(config, db).await
}
