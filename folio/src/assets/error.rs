//! Error types for the asset tools.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("image error for {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("'{program}' not found on PATH")]
    CommandNotFound { program: String },

    #[error("'{program}' exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("media credentials missing: {0}")]
    MissingCredentials(&'static str),

    #[error("invalid input pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("no files match '{0}'")]
    NoInputs(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("upload of {path} rejected with HTTP {status}: {message}")]
    UploadRejected {
        path: PathBuf,
        status: u16,
        message: String,
    },

    #[error("unexpected upload response: {0}")]
    InvalidResponse(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl AssetError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
