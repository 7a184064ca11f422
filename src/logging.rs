//! tracing setup for the `contingent` binary.
//!
//! Events go to stderr, so stdout carries only the printed report, and to
//! two daily files under [`get_log_dir`]: `contingent.*.log` with everything
//! the filter lets through and `error.*.log` with warnings and errors.
//! `RUST_LOG` overrides the default `info` level; `debug` adds one line per
//! batch.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const KEEP_LOG_FILES: usize = 10;

/// `<data dir>/contingent/logs`, created on first use.
pub fn get_log_dir() -> Result<PathBuf> {
    let log_dir = dirs::data_dir()
        .context("Failed to determine data directory")?
        .join("contingent")
        .join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    Ok(log_dir)
}

fn daily_appender(log_dir: &Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(KEEP_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} log appender"))
}

/// Installs the global subscriber. Call once, before any analysis runs.
///
/// # Errors
///
/// Fails if the log directory or appenders cannot be created, or if a
/// subscriber is already installed.
pub fn init() -> Result<()> {
    let log_dir = get_log_dir()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    let run_layer = fmt::layer()
        .with_ansi(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(daily_appender(&log_dir, "contingent")?);

    let error_layer = fmt::layer()
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(daily_appender(&log_dir, "error")?)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(run_layer)
        .with(error_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(log_dir = %log_dir.display(), "Logging initialized");
    Ok(())
}
