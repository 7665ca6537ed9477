//! CLI error type.

use std::fmt;

use folio::assets::AssetError;
use folio::config::ConfigError;
use folio::logging::LoggingError;
use folio::routes::RouteTableError;
use folio::server::ServerError;

/// Errors surfaced to the user by `folio` subcommands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, parsed or saved.
    Config(String),
    /// Logging could not be initialized.
    Logging(String),
    /// The route table is invalid.
    Routes(RouteTableError),
    /// The HTTP server failed to start or crashed.
    Serve(String),
    /// An asset tool failed.
    Asset(AssetError),
    /// The async runtime could not be created.
    Runtime(std::io::Error),
    /// Some items of a batch failed.
    Partial { failed: usize, total: usize },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(msg) => write!(f, "Logging error: {}", msg),
            CliError::Routes(e) => write!(f, "Route table error: {}", e),
            CliError::Serve(msg) => write!(f, "Server error: {}", msg),
            CliError::Asset(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Partial { failed, total } => {
                write!(f, "{} of {} items failed", failed, total)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e.to_string())
    }
}

impl From<RouteTableError> for CliError {
    fn from(e: RouteTableError) -> Self {
        CliError::Routes(e)
    }
}

impl From<ServerError> for CliError {
    fn from(e: ServerError) -> Self {
        CliError::Serve(e.to_string())
    }
}

impl From<AssetError> for CliError {
    fn from(e: AssetError) -> Self {
        CliError::Asset(e)
    }
}
