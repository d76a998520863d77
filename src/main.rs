//! Application entry point: Alessandro voice assistant.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load credentials files (`env.txt`, then `.env`) into the environment.
//! 3. Load [`AppConfig`] from disk and overlay the environment.
//! 4. Validate that every service is configured.
//! 5. Build the service adapters and run exactly one turn.

use std::path::Path;

use alessandro::{
    config::{AppConfig, AppPaths},
    pipeline::TurnPipeline,
};
use anyhow::Context;

/// Load a `KEY=value` file into the process environment if it exists.
///
/// Variables already set are left untouched.
fn load_credentials(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => log::debug!("loaded credentials from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("could not read {}: {e}", path.display()),
    }
}

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Credentials
    let paths = AppPaths::new();
    load_credentials(Path::new(AppPaths::CREDENTIALS_FILE_NAME));
    load_credentials(&paths.credentials_file);
    load_credentials(Path::new(".env"));

    // 3. Configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    config.apply_env();

    // 4. Validation
    config.validate()?;

    // 5. One turn
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let pipeline = TurnPipeline::from_config(&config);
    match rt.block_on(pipeline.run_turn())? {
        Some(outcome) => log::debug!(
            "turn finished: {} ({:?})",
            outcome.stage.label(),
            outcome.synthesis
        ),
        None => log::debug!("turn finished without a reply"),
    }
    Ok(())
}
