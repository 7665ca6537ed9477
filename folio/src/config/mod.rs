//! INI configuration file.
//!
//! Looked up as `./folio.ini` when present, otherwise
//! `<config_dir>/folio/config.ini`. Missing keys fall back to defaults, so an
//! empty or absent file is a valid configuration.
//!
//! ```ini
//! [site]
//! name = Sam Rivera
//! tagline = Photographer and developer
//! base_url = https://samrivera.dev
//! email = hello@samrivera.dev
//!
//! [server]
//! bind = 127.0.0.1:3000
//! environment = production
//! region = fra1
//!
//! [assets]
//! public_dir = public
//!
//! [media]
//! cloud_name = samrivera
//! api_key = 123456
//! api_secret = ...
//! folder = portfolio
//!
//! [logging]
//! level = info
//! directory = /var/log/folio
//! ```
//!
//! `FOLIO_MEDIA_API_SECRET` overrides `media.api_secret` so the secret does
//! not have to live on disk.

mod keys;

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

pub use keys::ConfigKey;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "folio.ini";

/// Environment variable overriding `media.api_secret`.
pub const API_SECRET_ENV: &str = "FOLIO_MEDIA_API_SECRET";

/// Errors from loading, saving or editing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse config {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("failed to write config {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// `[site]`
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSettings {
    pub name: String,
    pub tagline: String,
    /// Absolute origin used for sitemap URLs, without trailing slash.
    pub base_url: String,
    pub email: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: "Portfolio".to_string(),
            tagline: "Selected work".to_string(),
            base_url: "http://localhost:3000".to_string(),
            email: String::new(),
        }
    }
}

/// `[server]`
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub bind: String,
    /// Reported by the health check.
    pub environment: String,
    /// Reported by the health check.
    pub region: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            environment: "development".to_string(),
            region: "local".to_string(),
        }
    }
}

/// `[assets]`
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSettings {
    pub public_dir: PathBuf,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public"),
        }
    }
}

/// `[media]` credentials for the media host.
#[derive(Clone, PartialEq)]
pub struct MediaSettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: "portfolio".to_string(),
        }
    }
}

impl std::fmt::Debug for MediaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSettings")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &if self.api_secret.is_empty() { "" } else { "***" })
            .field("folder", &self.folder)
            .finish()
    }
}

impl MediaSettings {
    /// Whether enough is set to sign an upload.
    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for the daily log file.
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: dirs::data_local_dir()
                .map(|d| d.join("folio").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs")),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub site: SiteSettings,
    pub server: ServerSettings,
    pub assets: AssetSettings,
    pub media: MediaSettings,
    pub logging: LoggingSettings,
}

/// Path of the active configuration file.
///
/// `./folio.ini` wins when it exists; otherwise the per-user file, which may
/// not exist yet.
pub fn config_file_path() -> PathBuf {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return local;
    }
    dirs::config_dir()
        .map(|d| d.join("folio").join("config.ini"))
        .unwrap_or(local)
}

impl ConfigFile {
    /// Load the active configuration file, applying environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> ConfigResult<Self> {
        let path = config_file_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load a specific file without environment overrides.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|s| s.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save to the active configuration path.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save every key to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) {
        if let Ok(secret) = env::var(API_SECRET_ENV) {
            if !secret.is_empty() {
                self.media.api_secret = secret;
            }
        }
    }
}
