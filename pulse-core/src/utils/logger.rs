//! Logging Infrastructure
//!
//! Console output by default, a daily rolling file (`pulse.YYYY-MM-DD`) when
//! the log directory exists. `RUST_LOG` takes precedence over the configured level.

use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::core::Config;

/// Initialize the logger (console, info)
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger from [`Config`] (`LOG_LEVEL`, `LOG_JSON`, `LOG_DIR`)
pub fn init_logger_from_config(config: &Config) {
    init_logger_with_file(Some(&config.log_level), config.log_json, config.log_dir.as_deref());
}

/// Initialize the logger with optional JSON format and file output
///
/// Only the first call installs a subscriber, later calls are no-ops.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, ansi) = match log_dir.map(Path::new).filter(|dir| dir.exists()) {
        Some(dir) => (BoxMakeWriter::new(tracing_appender::rolling::daily(dir, "pulse")), false),
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("Logger already initialized");
    }
}
