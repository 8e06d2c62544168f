pub mod config;
pub mod navigate;
pub mod runner;

use anyhow::{anyhow, Result};
use tracing_subscriber::filter::LevelFilter;

/// Installs the global log subscriber. Logs go to stderr so stdout carries only
/// instructions.
pub fn log_init(level: LevelFilter) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))
}
