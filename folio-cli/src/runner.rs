//! Shared command bootstrap: configuration plus logging.

use folio::config::{config_file_path, ConfigError, ConfigFile, ConfigResult};
use folio::logging::{init_logging, LoggingGuard};
use tracing::{info, warn};

use crate::error::CliError;

/// Loaded configuration and the logging guard for one command run.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Console logging only.
    pub fn new() -> Result<Self, CliError> {
        Self::build(false)
    }

    /// Console plus the daily log file, for long-running commands.
    pub fn with_log_file() -> Result<Self, CliError> {
        Self::build(true)
    }

    fn build(to_file: bool) -> Result<Self, CliError> {
        let (config, load_error) = config_or_default(ConfigFile::load());
        let logging = init_logging(&config.logging, to_file)?;

        if let Some(e) = load_error {
            warn!(error = %e, "Using default configuration");
        }
        if let Some(dir) = logging.log_dir() {
            info!(dir = %dir.display(), "Writing log file");
        }

        Ok(Self {
            config,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = folio::VERSION,
            config = %config_file_path().display(),
            "folio starting"
        );
    }
}

/// Fall back to defaults on a broken file, handing the error back so it can
/// be logged once logging is up.
fn config_or_default(loaded: ConfigResult<ConfigFile>) -> (ConfigFile, Option<ConfigError>) {
    match loaded {
        Ok(config) => (config, None),
        Err(e) => (ConfigFile::default(), Some(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_broken_config_falls_back_and_reports() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folio.ini");
        std::fs::write(&path, "[server\nbind = 127.0.0.1:3000\n").unwrap();

        let (config, error) = config_or_default(ConfigFile::load_from(&path));
        assert_eq!(config, ConfigFile::default());
        assert!(error.is_some());
    }

    #[test]
    fn test_valid_config_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folio.ini");
        let mut saved = ConfigFile::default();
        saved.site.name = "Ada".to_string();
        saved.save_to(&path).unwrap();

        let (config, error) = config_or_default(ConfigFile::load_from(&path));
        assert_eq!(config.site.name, "Ada");
        assert!(error.is_none());
    }
}
