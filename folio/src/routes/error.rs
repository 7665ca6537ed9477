//! Route table and module loading errors.

use std::io;
use std::path::Path;

use thiserror::Error;

use super::RouteId;

/// Errors raised while building a [`RouteTable`](super::RouteTable).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteTableError {
    /// No entry uses the catch-all pattern.
    #[error("route table has no catch-all entry")]
    MissingCatchAll,

    /// More than one entry uses the catch-all pattern.
    #[error("route table has {count} catch-all entries, expected exactly one")]
    MultipleCatchAll { count: usize },

    /// The catch-all entry is not the final entry.
    #[error("catch-all entry must be last, found at position {position} of {len}")]
    CatchAllNotLast { position: usize, len: usize },

    /// Two entries share the same path pattern.
    #[error("duplicate route pattern: {0}")]
    DuplicatePattern(String),

    /// Two entries share the same route identifier.
    #[error("duplicate route id: {0}")]
    DuplicateId(RouteId),
}

/// Failure to resolve a route's deferred page module.
///
/// Cloneable because a single resolution is shared by every navigation
/// waiting on it, failures included.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The module's backing data could not be read.
    #[error("failed to load {route}: {path}: {reason}")]
    Io {
        route: RouteId,
        path: String,
        reason: String,
    },

    /// The loader reported a failure of its own.
    #[error("failed to load {route}: {reason}")]
    Failed { route: RouteId, reason: String },
}

impl LoadError {
    /// Wrap an I/O error raised while reading `path`.
    pub fn io(route: RouteId, path: &Path, source: &io::Error) -> Self {
        Self::Io {
            route,
            path: path.display().to_string(),
            reason: source.to_string(),
        }
    }

    /// A loader failure with a free-form reason.
    pub fn failed(route: RouteId, reason: impl Into<String>) -> Self {
        Self::Failed {
            route,
            reason: reason.into(),
        }
    }

    /// The route whose module failed.
    pub fn route(&self) -> RouteId {
        match self {
            Self::Io { route, .. } | Self::Failed { route, .. } => *route,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = LoadError::failed(RouteId::About, "network unreachable");
        assert_eq!(err.to_string(), "failed to load about: network unreachable");
        assert_eq!(err.route(), RouteId::About);
    }

    #[test]
    fn test_io_load_error_keeps_path() {
        let source = io::Error::new(io::ErrorKind::NotFound, "no such directory");
        let err = LoadError::io(RouteId::Gallery, Path::new("public/gallery"), &source);
        assert!(err.to_string().contains("public/gallery"));
        assert!(err.to_string().contains("no such directory"));
    }

    #[test]
    fn test_table_error_display() {
        let err = RouteTableError::CatchAllNotLast {
            position: 1,
            len: 3,
        };
        assert_eq!(
            err.to_string(),
            "catch-all entry must be last, found at position 1 of 3"
        );
    }
}
