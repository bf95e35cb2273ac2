//! # Logging Setup
//!
//! Installs the global `tracing` subscriber.
//!
//! - `LOG_LEVEL` selects the filter (`trace`, `debug`, `info`, `warn`, `error`;
//!   anything else falls back to `info`).
//! - `LOG_FORMAT=json` emits one JSON object per event, for log shippers. Any other
//!   value gives the detailed human-readable format.
//!
//! Timestamps are RFC3339 in UTC for both formats.

use lib_core::Config;
use tracing_subscriber::EnvFilter;

/// Map a configured level name to a filter directive.
pub fn level_directive(log_level: &str) -> &'static str {
    match log_level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Fails if a global subscriber was already installed.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::new(level_directive(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true) // Show module paths
        .with_line_number(true) // Show line numbers
        .with_file(true); // Show file names

    if config.log_format == "json" {
        builder
            .json()
            .with_current_span(true)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {}", e))?;
    } else {
        builder
            .with_thread_ids(true) // Show thread IDs
            .with_thread_names(true) // Show thread names
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {}", e))?;
    }

    Ok(())
}
