//! Manifest file lister
//!
//! Reads resources from YAML or JSON files instead of a live cluster, which
//! makes it possible to graph a set of manifests before applying them.

use super::lister::ResourceLister;
use crate::eventing::EventingKind;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use tokio::sync::OnceCell;

/// Lists eventing resources from manifest files
///
/// Files may hold several YAML documents and `*List` wrappers. Documents
/// without a namespace are treated as belonging to the requested one.
/// Files are read once, on the first successful listing.
pub struct FileLister {
    paths: Vec<PathBuf>,
    objects: OnceCell<Vec<Value>>,
}

impl FileLister {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            objects: OnceCell::new(),
        }
    }

    async fn objects(&self) -> Result<&[Value]> {
        let objects = self.objects.get_or_try_init(|| self.load_all()).await?;
        Ok(objects.as_slice())
    }

    async fn load_all(&self) -> Result<Vec<Value>> {
        let mut objects = Vec::new();
        for path in &self.paths {
            tracing::debug!("Reading manifests from {:?}", path);
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read manifest file: {:?}", path))?;
            let documents = parse_documents(&content)
                .with_context(|| format!("Failed to parse manifests in {:?}", path))?;
            objects.extend(documents);
        }
        Ok(objects)
    }
}

#[async_trait]
impl ResourceLister for FileLister {
    async fn list(&self, kind: EventingKind, namespace: &str) -> Result<Vec<Value>> {
        let objects = self.objects().await?;
        Ok(objects
            .iter()
            .filter(|obj| classify(obj) == Some(kind) && in_namespace(obj, namespace))
            .cloned()
            .collect())
    }

    fn describe(&self) -> String {
        let paths: Vec<String> = self
            .paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        format!("manifests {}", paths.join(", "))
    }
}

/// Split a file into objects, unwrapping `*List` documents
fn parse_documents(content: &str) -> Result<Vec<Value>> {
    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document)?;
        flatten_into(value, &mut objects);
    }
    Ok(objects)
}

fn flatten_into(value: Value, out: &mut Vec<Value>) {
    let is_list = value
        .get("kind")
        .and_then(Value::as_str)
        .is_some_and(|k| k.ends_with("List"));

    match value {
        Value::Null => {}
        Value::Object(mut map) if is_list => {
            if let Some(Value::Array(items)) = map.remove("items") {
                for item in items {
                    flatten_into(item, out);
                }
            }
        }
        Value::Object(map) => out.push(Value::Object(map)),
        other => tracing::warn!("Ignoring non-object manifest document: {}", other),
    }
}

fn classify(obj: &Value) -> Option<EventingKind> {
    let api_version = obj.get("apiVersion").and_then(Value::as_str)?;
    let kind = obj.get("kind").and_then(Value::as_str)?;
    EventingKind::classify(api_version, kind)
}

fn in_namespace(obj: &Value, namespace: &str) -> bool {
    match obj.pointer("/metadata/namespace").and_then(Value::as_str) {
        Some(ns) => ns == namespace,
        None => true,
    }
}
