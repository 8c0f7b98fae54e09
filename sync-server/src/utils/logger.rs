//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and
//! production environments.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// Respects `RUST_LOG`; defaults to info for the server and tower-http.
pub fn init_logger() {
    init_logger_with_file(None);
}

/// Initialize the logger with optional daily-rotated file output
pub fn init_logger_with_file(log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sync_server=info,tower_http=info".into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided and exists
    if let Some(dir) = log_dir {
        if Path::new(dir).exists() {
            let file_appender = tracing_appender::rolling::daily(dir, "sync-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();

    if let Some(dir) = log_dir {
        tracing::warn!(dir = %dir, "LOG_DIR does not exist, logging to stdout");
    }
}
