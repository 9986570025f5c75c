//! PixiAlbum - event gallery client
//!
//! Headless entry point: opens one event, pages through it and prints the
//! column layout.

mod app;
mod args;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = args::Cli::parse();

    // Initialize logging and panic hook first
    let _log = app_log::init()?;

    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("PixiAlbum starting...");

    let mut config = app_core::AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable configuration: {}", e);
        app_core::AppConfig::default()
    });
    if let Some(base_url) = cli.base_url.clone() {
        config.api.base_url = base_url;
    }
    if let Some(path) = cli.database.clone() {
        config.storage.database_path = Some(path);
    }
    if cli.write_config {
        let path = config.save()?;
        println!("Configuration written to {}", path.display());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(app::run(config, cli))
}
