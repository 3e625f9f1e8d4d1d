//! Configuration path resolution
//!
//! `KNGRAPH_CONFIG_DIR` wins; otherwise the platform config directory:
//! - Linux: `$XDG_CONFIG_HOME/kngraph` or `~/.config/kngraph`
//! - macOS: `~/Library/Application Support/dev.knative.kngraph`
//! - Windows: `%APPDATA%\knative\kngraph\config`

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "KNGRAPH_CONFIG_DIR";

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    config_dir_from(std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from))
}

fn config_dir_from(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| {
            ProjectDirs::from("dev", "knative", "kngraph")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".").join(".config").join("kngraph"))
        })
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
