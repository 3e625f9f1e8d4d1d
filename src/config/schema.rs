//! Configuration schema definitions
//!
//! Defines the structure of `config.yaml` using serde. Unknown keys are
//! rejected so that typos surface in `config validate`.

use crate::render::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Namespace to graph when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default)]
    pub renderer: RendererConfig,

    #[serde(default)]
    pub graph: GraphConfig,
}

/// Graphviz invocation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RendererConfig {
    /// Image format for `render`
    #[serde(default)]
    pub format: OutputFormat,

    /// Path to the `dot` executable; searched on PATH when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dot_path: Option<PathBuf>,

    /// Where `render` writes its output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Graph-level DOT attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GraphConfig {
    #[serde(default = "default_rankdir")]
    pub rankdir: String,

    /// Graph title; `Triggers in <namespace>` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            rankdir: default_rankdir(),
            title: None,
        }
    }
}

fn default_rankdir() -> String {
    "LR".to_string()
}
