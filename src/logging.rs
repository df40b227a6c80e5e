//! Logging setup: compact lines on stderr, plus an optional JSON log file.

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{BlogError, Result};

const DEFAULT_LOG_FILE_NAME: &str = "blogql.log";

/// Directives used when `RUST_LOG` is unset.
fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("blogql={level},tower_http={level}")
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

/// Daily-rotated appender writing `<log_file>.<date>` next to `log_file`.
fn file_appender(log_file: &Path) -> Result<RollingFileAppender> {
    let dir = match log_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let prefix = log_file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE_NAME);

    std::fs::create_dir_all(dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .build(dir)
        .map_err(|e| {
            BlogError::Config(format!("Cannot open log file {}: {}", log_file.display(), e))
        })
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `verbose`. With `log_file`, every event is also
/// written there as one JSON object per line.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let file_layer = match log_file {
        Some(path) => Some(
            fmt::layer()
                .with_writer(file_appender(path)?)
                .with_ansi(false)
                .json(),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| BlogError::Config(format!("Cannot install logger: {}", e)))
}
