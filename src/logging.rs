// src/logging.rs

//! Logging setup for `highway` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `HIGHWAY_LOG` environment variable (e.g. "info", "debug", or a full
//!    filter directive like "highway::exec=debug")
//! 3. `debug` when `--verbose` is set
//! 4. default to `warn`
//!
//! Logs are sent to STDERR so that task stdout stays clean.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "HIGHWAY_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, verbose: bool) -> Result<()> {
    let directive = filter_directive(cli_level, std::env::var(LOG_ENV).ok().as_deref(), verbose);
    let filter = EnvFilter::try_new(&directive)
        .or_else(|_| EnvFilter::try_new(default_level(verbose)))?;

    // Send logs to stderr; keep stdout free for task output.
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

fn filter_directive(cli_level: Option<LogLevel>, env_value: Option<&str>, verbose: bool) -> String {
    if let Some(lvl) = cli_level {
        return level_from_log_level(lvl).to_string();
    }
    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directive) => directive.to_string(),
        None => default_level(verbose).to_string(),
    }
}

fn default_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn level_from_log_level(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
