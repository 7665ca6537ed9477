//! `folio config` - inspect and edit the INI configuration.

use std::path::Path;

use clap::Subcommand;
use folio::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

const MASK: &str = "********";

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value (section.key, e.g. site.base_url)
    Get { key: String },

    /// Validate and store a value
    Set { key: String, value: String },

    /// Restore a key to its default
    Unset { key: String },

    /// Print every setting, grouped by section
    List {
        /// Print secrets instead of masking them
        #[arg(long)]
        show_secrets: bool,
    },

    /// Print the path of the active configuration file
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            println!("{}", display_value(key, &ConfigFile::load()?, true));
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            edit(&path, |config| key.set(config, &value))?;
            println!("{} = {}", key.name(), display_value(key, &ConfigFile::load_from(&path)?, false));
            Ok(())
        }
        ConfigCommands::Unset { key } => {
            let key = parse_key(&key)?;
            edit(&path, |config| {
                key.reset(config);
                Ok(())
            })?;
            println!("{} reset to default", key.name());
            Ok(())
        }
        ConfigCommands::List { show_secrets } => {
            print_list(&ConfigFile::load()?, show_secrets);
            Ok(())
        }
        ConfigCommands::Path => {
            let marker = if path.is_file() { "" } else { " (not created yet)" };
            println!("{}{}", path.display(), marker);
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "unknown key '{}', run 'folio config list' for the available keys",
            key
        ))
    })
}

/// Load the file itself (no environment overrides), apply `change`, save.
fn edit<F>(path: &Path, change: F) -> Result<(), CliError>
where
    F: FnOnce(&mut ConfigFile) -> Result<(), folio::config::ConfigError>,
{
    let mut config = if path.is_file() {
        ConfigFile::load_from(path)?
    } else {
        ConfigFile::default()
    };
    change(&mut config)?;
    config.save_to(path)?;
    Ok(())
}

fn display_value(key: ConfigKey, config: &ConfigFile, reveal: bool) -> String {
    let value = key.get(config);
    if value.is_empty() {
        "(not set)".to_string()
    } else if key.is_secret() && !reveal {
        MASK.to_string()
    } else {
        value
    }
}

fn print_list(config: &ConfigFile, show_secrets: bool) {
    let mut section = "";
    for key in ConfigKey::all() {
        if key.section() != section {
            if !section.is_empty() {
                println!();
            }
            section = key.section();
            println!("[{}]", section);
        }
        println!("  {} = {}", key.key_name(), display_value(*key, config, show_secrets));
    }
}
