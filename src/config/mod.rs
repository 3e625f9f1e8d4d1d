//! Configuration system for kngraph
//!
//! A single YAML file plus environment overrides. Values are addressed by
//! dotted keys (`renderer.format`) for the `config get|set` commands.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::{ConfigLoader, default_output_path};
pub use schema::{Config, GraphConfig, RendererConfig};

use crate::render::OutputFormat;
use std::path::PathBuf;

/// Every key accepted by `get_config_value` / `set_config_value`
pub const CONFIG_KEYS: &[&str] = &[
    "namespace",
    "renderer.format",
    "renderer.dotPath",
    "renderer.output",
    "graph.rankdir",
    "graph.title",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    let display = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    };
    match key {
        "namespace" => Ok(config.namespace.clone().unwrap_or_default()),
        "renderer.format" => Ok(config.renderer.format.to_string()),
        "renderer.dotPath" => Ok(display(&config.renderer.dot_path)),
        "renderer.output" => Ok(display(&config.renderer.output)),
        "graph.rankdir" => Ok(config.graph.rankdir.clone()),
        "graph.title" => Ok(config.graph.title.clone().unwrap_or_default()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
///
/// An empty value clears optional settings.
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
    match key {
        "namespace" => config.namespace = optional(value),
        "renderer.format" => {
            config.renderer.format = value
                .parse::<OutputFormat>()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        "renderer.dotPath" => config.renderer.dot_path = optional(value).map(PathBuf::from),
        "renderer.output" => config.renderer.output = optional(value).map(PathBuf::from),
        "graph.rankdir" => {
            let rankdir = value.to_uppercase();
            if !crate::render::RANKDIRS.contains(&rankdir.as_str()) {
                anyhow::bail!(
                    "graph.rankdir must be one of {}",
                    crate::render::RANKDIRS.join(", ")
                );
            }
            config.graph.rankdir = rankdir;
        }
        "graph.title" => config.graph.title = optional(value),
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
    Ok(())
}

/// Pick the namespace to graph
///
/// Flag, then config (already carrying env overrides), then the kubeconfig
/// context namespace, then `default`.
pub fn resolve_namespace(
    flag: Option<&str>,
    config: &Config,
    kubeconfig_default: Option<&str>,
) -> String {
    flag.or(config.namespace.as_deref())
        .or(kubeconfig_default)
        .filter(|ns| !ns.is_empty())
        .unwrap_or(crate::kube::FALLBACK_NAMESPACE)
        .to_string()
}
