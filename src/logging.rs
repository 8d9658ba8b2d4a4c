//! Logging setup for hosts embedding the feature stage.
//!
//! The library itself only emits `tracing` events. A host process calls
//! [`init`] once to route them to the console and, optionally, to daily
//! rolling files.
//!
//! ```no_run
//! use credit_features::{config::LoggingConfig, logging};
//!
//! logging::init(&LoggingConfig::default()).expect("Failed to initialize logging");
//! tracing::info!("Scoring batch started");
//! ```

use crate::config::LoggingConfig;
use anyhow::{Context as _, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Builds the env filter: `RUST_LOG` if set, otherwise the configured level.
///
/// # Errors
///
/// Returns error if the configured level is not a valid filter directive
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log filter: {level}"))
}

/// Initializes console logging plus an optional `credit_features.*.log`
/// file that rotates daily, keeping 10 files.
///
/// # Errors
///
/// Returns error if the log directory cannot be created, the filter is
/// invalid or a global subscriber is already installed
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_filter(&config.level)?;

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true);

    let file_layer = match &config.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir).with_context(|| {
                format!("Failed to create log directory: {}", log_dir.display())
            })?;

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(10)
                .filename_prefix("credit_features")
                .filename_suffix("log")
                .build(log_dir)
                .context("Failed to create file appender")?;

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_writer(appender),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(log_dir = ?config.log_dir, "Logging initialized");

    Ok(())
}
