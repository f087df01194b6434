//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `ipinfo` library that handles:
//! - Command-line and environment configuration
//! - Logger initialization
//! - Exit status on fatal errors
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use std::process;

use ipinfo::initialization::init_logger_with;
use ipinfo::{run_server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Flags override environment variables, which override defaults
    let config = Config::load();

    init_logger_with(config.effective_log_level().into(), config.log_format)
        .context("Failed to initialize logger")?;

    log::info!(
        "Starting ipinfo ({:?} mode, language {})",
        config.mode,
        config.language
    );

    if let Err(e) = run_server(config).await {
        log::error!("{:#}", e);
        eprintln!("ipinfo error: {:#}", e);
        process::exit(1);
    }

    Ok(())
}
