//! Process-wide tracing setup.
//!
//! Console output goes to stderr. When a log directory is given, a second
//! layer writes plain-text lines to a daily rolling file through a
//! non-blocking writer; the returned [`LoggingGuard`] must be held until
//! exit or buffered lines are lost.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// Log file prefix; the appender adds the date suffix.
pub const LOG_FILE_PREFIX: &str = "folio.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Keeps the file writer alive. Dropping it flushes pending lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
    log_file_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Directory holding the rolling log file, if file logging is on.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_file_dir.as_deref()
    }
}

impl std::fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingGuard")
            .field("log_file_dir", &self.log_file_dir)
            .finish_non_exhaustive()
    }
}

/// `RUST_LOG` when set, otherwise `default_level`.
pub fn build_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_level).map_err(|e| LoggingError::InvalidFilter {
        filter: default_level.to_string(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// With `to_file`, lines are also appended to
/// `<settings.directory>/folio.log.<date>`.
pub fn init_logging(settings: &LoggingSettings, to_file: bool) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&settings.level)?;

    let console = fmt::layer()
        .with_timer(LocalTime::new(Rfc3339))
        .with_target(false)
        .with_writer(io::stderr);

    let (file_layer, file_guard, log_file_dir) = if to_file {
        let dir = settings.directory.clone();
        std::fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_timer(LocalTime::new(Rfc3339))
            .with_ansi(false)
            .with_writer(writer);
        (Some(layer), Some(guard), Some(dir))
    } else {
        (None, None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _file: file_guard,
        log_file_dir,
    })
}
