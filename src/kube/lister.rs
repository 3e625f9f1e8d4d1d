//! Resource lister trait

use crate::eventing::EventingKind;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Lists raw eventing objects of one kind
///
/// Implementations return objects with `apiVersion` and `kind` filled in, in
/// a stable order, so that building the graph twice from the same cluster
/// state yields the same output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceLister: Send + Sync {
    /// List every object of `kind` in `namespace`
    async fn list(&self, kind: EventingKind, namespace: &str) -> Result<Vec<Value>>;

    /// Short description of where objects come from, for logs
    fn describe(&self) -> String;
}
