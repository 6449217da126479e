//! Logging for the `floor` tool
//!
//! `RUST_LOG` wins when set. Otherwise the configured level applies to this
//! workspace's crates while HTTP internals stay at `warn`, so a `debug` run
//! shows the POS calls without the connection chatter.

use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Prefix of the daily rolling log file
pub const LOG_FILE_PREFIX: &str = "floor-editor.log";

/// Where log lines end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    /// Daily file under this directory
    File(PathBuf),
}

/// Filter directives for a configured level
///
/// Unknown levels fall back to `info`.
pub fn default_directives(level: &str) -> String {
    let level = match level.trim().to_ascii_lowercase().as_str() {
        l @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => l.to_string(),
        _ => "info".to_string(),
    };
    format!("warn,floor_editor={level},onslip_client={level},shared={level},reqwest=warn,hyper=warn")
}

/// Log to stderr at `info`
pub fn init_logger() -> LogOutput {
    init_logger_with_file("info", None)
}

/// Log at `level`, to a daily file when `log_dir` exists
///
/// A missing directory falls back to stderr. Installing twice keeps the
/// first subscriber.
pub fn init_logger_with_file(level: &str, log_dir: Option<&Path>) -> LogOutput {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let output = match log_dir {
        Some(dir) if dir.is_dir() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let _ = subscriber.with_ansi(false).with_writer(appender).try_init();
            LogOutput::File(dir.to_path_buf())
        }
        missing => {
            let _ = subscriber.with_writer(std::io::stderr).try_init();
            if let Some(dir) = missing {
                tracing::warn!(dir = %dir.display(), "Log directory does not exist, logging to stderr");
            }
            LogOutput::Stderr
        }
    };

    tracing::debug!(?output, level, "Logging started");
    output
}
