//! Configuration command handlers

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{self, CONFIG_KEYS, Config, ConfigLoader, paths};

/// Configuration management subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigSubcommand {
    /// Get configuration value, or the whole effective configuration
    Get {
        /// Configuration key (e.g., "namespace", "renderer.format")
        key: Option<String>,
    },
    /// Set configuration value in the config file
    Set {
        /// Configuration key (e.g., "namespace", "renderer.format")
        key: String,
        /// Configuration value; empty clears optional settings
        value: String,
    },
    /// List all configuration keys with their effective values
    List,
    /// Show configuration file path
    Path,
    /// Validate the configuration file
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            match key {
                Some(key) => println!("{}", config::get_config_value(&config, &key)?),
                None => {
                    let yaml = serde_yaml::to_string(&config)
                        .context("Failed to serialize configuration")?;
                    print!("{}", yaml);
                }
            }
        }
        ConfigSubcommand::Set { key, value } => {
            // Start from the file alone so environment overrides are not persisted
            let root_path = paths::root_config_path();
            let mut config = if root_path.exists() {
                ConfigLoader::load_file(&root_path)?
            } else {
                Config::default()
            };

            config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;

            let path = ConfigLoader::save_root(&config).context("Failed to save configuration")?;
            println!("Configuration saved to {}", path.display());
        }
        ConfigSubcommand::List => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            for line in list_lines(&config)? {
                println!("{}", line);
            }
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
        }
        ConfigSubcommand::Validate => {
            let root_path = paths::root_config_path();
            if root_path.exists() {
                ConfigLoader::validate_file(&root_path)
                    .context("Configuration validation failed")?;
                println!("Configuration is valid");
            } else {
                println!(
                    "No configuration file at {}; using defaults",
                    root_path.display()
                );
            }
        }
    }

    Ok(())
}

/// `key = value` for every known key
fn list_lines(config: &Config) -> Result<Vec<String>> {
    CONFIG_KEYS
        .iter()
        .map(|key| Ok(format!("{} = {}", key, config::get_config_value(config, key)?)))
        .collect()
}
