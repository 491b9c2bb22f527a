//! Logging setup.
//!
//! Installs a `tracing` subscriber with a stderr layer and, optionally, a
//! daily rolling log file. `RUST_LOG` overrides the configured level.

use std::path::PathBuf;

pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// File name prefix of rolling log files.
pub const LOG_FILE_PREFIX: &str = "wbmedia.log";

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (`info`, `wbmedia=debug`, ...).
    pub level: String,
    /// Directory for daily rolling log files. Stderr only when `None`.
    pub file_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Replaces the level directive.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

/// Errors from subscriber installation.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {reason}")]
    Filter { directive: String, reason: String },

    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for the life of the process. It is `None` without a log file.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = build_filter(config)?;
    let timer = LocalTime::rfc_3339();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_target(false);

    let (file_layer, guard) = match &config.file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(timer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;

    Ok(guard)
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| LoggingError::Filter {
        directive: config.level.clone(),
        reason: e.to_string(),
    })
}
