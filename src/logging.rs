//! File logging. The terminal belongs to the TUI, so nothing goes to stdout.

use color_eyre::eyre::{eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Env var holding the filter directives, e.g. `storefront=debug`
pub const LOG_ENV: &str = "STOREFRONT_LOG";

const LOG_FILE: &str = "storefront.log";

/// `<data_dir>/storefront`, falling back to the working directory
pub fn log_dir() -> PathBuf {
  dirs::data_dir()
    .map(|dir| dir.join("storefront"))
    .unwrap_or_else(|| PathBuf::from("."))
}

/// Install the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init() -> Result<WorkerGuard> {
  let dir = log_dir();
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, LOG_FILE));

  tracing_subscriber::registry()
    .with(filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true),
    )
    .try_init()
    .map_err(|e| eyre!("Failed to install logger: {}", e))?;

  Ok(guard)
}

