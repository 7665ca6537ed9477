//! `section.key` names accepted by `folio config get/set`.

use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    SiteName,
    SiteTagline,
    SiteBaseUrl,
    SiteEmail,
    ServerBind,
    ServerEnvironment,
    ServerRegion,
    AssetsPublicDir,
    MediaCloudName,
    MediaApiKey,
    MediaApiSecret,
    MediaFolder,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        use ConfigKey::*;
        &[
            SiteName,
            SiteTagline,
            SiteBaseUrl,
            SiteEmail,
            ServerBind,
            ServerEnvironment,
            ServerRegion,
            AssetsPublicDir,
            MediaCloudName,
            MediaApiKey,
            MediaApiSecret,
            MediaFolder,
            LoggingLevel,
            LoggingDirectory,
        ]
    }

    pub fn section(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            SiteName | SiteTagline | SiteBaseUrl | SiteEmail => "site",
            ServerBind | ServerEnvironment | ServerRegion => "server",
            AssetsPublicDir => "assets",
            MediaCloudName | MediaApiKey | MediaApiSecret | MediaFolder => "media",
            LoggingLevel | LoggingDirectory => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            SiteName => "name",
            SiteTagline => "tagline",
            SiteBaseUrl => "base_url",
            SiteEmail => "email",
            ServerBind => "bind",
            ServerEnvironment => "environment",
            ServerRegion => "region",
            AssetsPublicDir => "public_dir",
            MediaCloudName => "cloud_name",
            MediaApiKey => "api_key",
            MediaApiSecret => "api_secret",
            MediaFolder => "folder",
            LoggingLevel => "level",
            LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Values that must not be echoed to the terminal.
    pub fn is_secret(&self) -> bool {
        matches!(self, ConfigKey::MediaApiSecret)
    }

    /// Restore the built-in default for this key.
    pub fn reset(&self, config: &mut ConfigFile) {
        let defaults = ConfigFile::default();
        // Defaults always pass validation.
        let _ = self.set(config, &self.get(&defaults));
    }

    /// Current value rendered as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        use ConfigKey::*;
        match self {
            SiteName => config.site.name.clone(),
            SiteTagline => config.site.tagline.clone(),
            SiteBaseUrl => config.site.base_url.clone(),
            SiteEmail => config.site.email.clone(),
            ServerBind => config.server.bind.clone(),
            ServerEnvironment => config.server.environment.clone(),
            ServerRegion => config.server.region.clone(),
            AssetsPublicDir => config.assets.public_dir.display().to_string(),
            MediaCloudName => config.media.cloud_name.clone(),
            MediaApiKey => config.media.api_key.clone(),
            MediaApiSecret => config.media.api_secret.clone(),
            MediaFolder => config.media.folder.clone(),
            LoggingLevel => config.logging.level.clone(),
            LoggingDirectory => config.logging.directory.display().to_string(),
        }
    }

    /// Validate and store `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        use ConfigKey::*;
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: self.name(),
            reason: reason.to_string(),
        };

        match self {
            SiteName => config.site.name = value.to_string(),
            SiteTagline => config.site.tagline = value.to_string(),
            SiteBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid("must start with http:// or https://"));
                }
                config.site.base_url = value.trim_end_matches('/').to_string();
            }
            SiteEmail => config.site.email = value.to_string(),
            ServerBind => {
                if value.parse::<std::net::SocketAddr>().is_err() {
                    return Err(invalid("expected host:port, e.g. 127.0.0.1:3000"));
                }
                config.server.bind = value.to_string();
            }
            ServerEnvironment => config.server.environment = value.to_string(),
            ServerRegion => config.server.region = value.to_string(),
            AssetsPublicDir => config.assets.public_dir = PathBuf::from(value),
            MediaCloudName => config.media.cloud_name = value.to_string(),
            MediaApiKey => config.media.api_key = value.to_string(),
            MediaApiSecret => config.media.api_secret = value.to_string(),
            MediaFolder => config.media.folder = value.trim_matches('/').to_string(),
            LoggingLevel => {
                if value.is_empty() {
                    return Err(invalid("must not be empty"));
                }
                config.logging.level = value.to_string();
            }
            LoggingDirectory => config.logging.directory = PathBuf::from(value),
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_keys() {
        assert_eq!("site.base_url".parse::<ConfigKey>().unwrap(), ConfigKey::SiteBaseUrl);
        assert_eq!("MEDIA.Folder".parse::<ConfigKey>().unwrap(), ConfigKey::MediaFolder);
        assert!(matches!(
            "site.colour".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = ConfigKey::all().iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ConfigKey::all().len());
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = ConfigFile::default();

        ConfigKey::SiteBaseUrl
            .set(&mut config, "https://example.com/")
            .unwrap();
        assert_eq!(config.site.base_url, "https://example.com");

        assert!(ConfigKey::SiteBaseUrl.set(&mut config, "example.com").is_err());
        assert!(ConfigKey::ServerBind.set(&mut config, "localhost").is_err());
        ConfigKey::ServerBind.set(&mut config, "0.0.0.0:8080").unwrap();
        assert_eq!(ConfigKey::ServerBind.get(&config), "0.0.0.0:8080");
    }

    #[test]
    fn test_reset_restores_default() {
        let mut config = ConfigFile::default();
        ConfigKey::MediaFolder.set(&mut config, "/clients/").unwrap();
        assert_eq!(config.media.folder, "clients");

        ConfigKey::MediaFolder.reset(&mut config);
        assert_eq!(config.media.folder, ConfigFile::default().media.folder);
        assert!(ConfigKey::MediaApiSecret.is_secret());
        assert!(!ConfigKey::MediaApiKey.is_secret());
    }
}
