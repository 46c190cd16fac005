//! Logging Infrastructure
//!
//! Structured logging for development (stdout) and production (daily
//! rolling files).

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger at `info`
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON format and file output
///
/// `RUST_LOG` wins over `log_level` when set.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let file_dir = log_dir.map(Path::new).filter(|p| p.exists());

    // try_init: tests and embedders may have installed a subscriber already
    let result = match (file_dir, json) {
        (Some(dir), true) => builder
            .json()
            .with_writer(tracing_appender::rolling::daily(dir, "shop-server"))
            .try_init(),
        (Some(dir), false) => builder
            .with_writer(tracing_appender::rolling::daily(dir, "shop-server"))
            .try_init(),
        (None, true) => builder.json().try_init(),
        (None, false) => builder.try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Logger already initialized");
    }
}
