//! Honeycomb - archive and image-folder browser
//!
//! Headless entry point exercising the archive VFS and the prefetch cache.

mod app;
mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Configuration first: it carries the log level
    let config = match &args.config {
        Some(path) => app_core::AppConfig::load_from(path)?,
        None => app_core::AppConfig::load().unwrap_or_else(|e| {
            eprintln!("Ignoring unreadable configuration: {}", e);
            app_core::AppConfig::default()
        }),
    };

    // Logging and panic hook
    let _log_guard = app_log::init(&config.logging.level)?;

    if let Err(e) = app_log::cleanup_old_logs(config.logging.keep_days) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Honeycomb starting...");

    let ctx = app_core::AppContext::new(config);
    app::run(&ctx, args.command)
}
