//! Configuration loading and validation
//!
//! Layers, lowest to highest precedence: built-in defaults, the config file,
//! then `KNGRAPH_*` environment variables. Command-line flags are applied
//! on top by the caller.

use super::{paths, schema::Config};
use crate::render::{OutputFormat, RANKDIRS};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment overrides and the setting each one replaces
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("KNGRAPH_NAMESPACE", "namespace"),
    ("KNGRAPH_FORMAT", "renderer.format"),
    ("KNGRAPH_DOT_PATH", "renderer.dotPath"),
    ("KNGRAPH_OUTPUT", "renderer.output"),
    ("KNGRAPH_RANKDIR", "graph.rankdir"),
    ("KNGRAPH_TITLE", "graph.title"),
];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the root config file (if any) with environment overrides applied
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load `path` (if it exists) with environment overrides applied
    pub fn load_from(path: &Path) -> Result<Config> {
        let config = if path.exists() {
            Self::load_file(path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };
        Ok(Self::apply_env_overrides(config, |name| std::env::var(name).ok()))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // An empty file is a valid, empty config
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Apply `KNGRAPH_*` overrides read through `lookup`
    ///
    /// Invalid values are logged and ignored.
    pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, key) in ENV_OVERRIDES {
            let Some(value) = lookup(name) else {
                continue;
            };
            if let Err(e) = super::set_config_value(&mut config, key, &value) {
                tracing::warn!("Ignoring {}={}: {:#}", name, value, e);
            }
        }
        config
    }

    /// Check a configuration for values that would fail at run time
    pub fn validate(config: &Config) -> Result<()> {
        if config.namespace.as_deref().is_some_and(str::is_empty) {
            anyhow::bail!("namespace must not be empty");
        }
        if !RANKDIRS.contains(&config.graph.rankdir.as_str()) {
            anyhow::bail!(
                "graph.rankdir must be one of {}, got '{}'",
                RANKDIRS.join(", "),
                config.graph.rankdir
            );
        }
        if let Some(dot_path) = &config.renderer.dot_path {
            if !dot_path.is_file() {
                anyhow::bail!(
                    "renderer.dotPath does not exist: {}",
                    dot_path.display()
                );
            }
        }
        Ok(())
    }

    /// Parse and validate the file at `path`
    pub fn validate_file(path: &Path) -> Result<()> {
        let config = Self::load_file(path)?;
        Self::validate(&config)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<PathBuf> {
        let path = paths::root_config_path();
        Self::save(config, &path)?;
        Ok(path)
    }
}

/// Output path `render` writes to when none is configured
pub fn default_output_path(format: OutputFormat, html: bool) -> PathBuf {
    let extension = if html { "html" } else { format.as_str() };
    std::env::temp_dir().join(format!("graph.{}", extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        assert!(ConfigLoader::load_file(&path).is_err());

        let config = ConfigLoader::load_from(&path).unwrap();
        assert_eq!(config.graph, GraphConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.namespace = Some("knative-demo".to_string());
        config.graph.rankdir = "TB".to_string();

        ConfigLoader::save(&config, &path).unwrap();
        let loaded = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_empty_file_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(ConfigLoader::load_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "graph: [").unwrap();
        let err = ConfigLoader::load_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::apply_env_overrides(
            Config::default(),
            env(&[
                ("KNGRAPH_NAMESPACE", "events"),
                ("KNGRAPH_FORMAT", "svg"),
                ("KNGRAPH_TITLE", "Event mesh"),
            ]),
        );
        assert_eq!(config.namespace.as_deref(), Some("events"));
        assert_eq!(config.renderer.format, OutputFormat::Svg);
        assert_eq!(config.graph.title.as_deref(), Some("Event mesh"));
        assert_eq!(config.graph.rankdir, "LR");
    }

    #[test]
    fn test_invalid_env_override_ignored() {
        let config =
            ConfigLoader::apply_env_overrides(Config::default(), env(&[("KNGRAPH_FORMAT", "gif")]));
        assert_eq!(config.renderer.format, OutputFormat::Png);
    }

    #[test]
    fn test_validate() {
        assert!(ConfigLoader::validate(&Config::default()).is_ok());

        let mut config = Config::default();
        config.graph.rankdir = "sideways".to_string();
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = Config::default();
        config.namespace = Some(String::new());
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = Config::default();
        config.renderer.dot_path = Some(PathBuf::from("/nonexistent/dot"));
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_default_output_path() {
        let path = default_output_path(OutputFormat::Svg, false);
        assert!(path.ends_with("graph.svg"));
        assert!(default_output_path(OutputFormat::Png, true).ends_with("graph.html"));
    }
}
