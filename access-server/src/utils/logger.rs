//! Logging Infrastructure
//!
//! Structured logging setup for development and production.
//! `RUST_LOG` takes precedence over the configured level when present.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger with optional JSON format and file output
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{level},sqlx=warn,tower_http=info"))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    // File output if log_dir exists
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "access-server");
            let _ = builder
                .with_ansi(false)
                .with_writer(file_appender)
                .json()
                .try_init();
            return;
        }
        eprintln!("Log directory {dir} does not exist, logging to stdout");
    }

    if json.unwrap_or(false) {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
