//! Logging initialization for fileshelf.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{Result, ShelfError};

/// Parse a configured level name. Unknown names fall back to INFO.
fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "off" => LevelFilter::OFF,
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// Build the filter: `RUST_LOG` directives win, the configured level is the default.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(parse_level(level).into())
        .from_env_lossy()
}

/// Initialize logging to stdout and, when `config.file` is set, to an
/// append-only log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);

    if config.file.is_empty() {
        return tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .with(filter)
            .try_init()
            .map_err(|e| ShelfError::Config(format!("logging init failed: {e}")));
    }

    if let Some(parent) = Path::new(&config.file).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)?;
    let writer = std::io::stdout.and(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .map_err(|e| ShelfError::Config(format!("logging init failed: {e}")))
}

/// Console-only logging, used when file logging cannot be set up.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(true)
                .with_target(true),
        )
        .with(build_filter(level))
        .try_init();
}
