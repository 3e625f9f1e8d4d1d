//! API server backed lister
//!
//! Eventing kinds have moved between API groups and versions over time, so
//! every kind is tried at each of its candidate coordinates, newest first,
//! until one is served. Sources have no fixed coordinates: they are found
//! through the CRDs that carry the eventing source label.

use super::lister::ResourceLister;
use crate::eventing::{EventingKind, KindCoordinates, SOURCE_CRD_LABEL};
use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject, TypeMeta};
use kube::{Api, Client};
use serde_json::Value;

/// Lists eventing resources from a live cluster
pub struct KubeLister {
    client: Client,
}

impl KubeLister {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// List a fixed kind, falling back through its candidate versions
    async fn list_with_fallback(&self, kind: EventingKind, namespace: &str) -> Result<Vec<Value>> {
        for coords in kind.candidates() {
            let api_resource = api_resource(coords, kind.as_str());
            match self.list_resource(&api_resource, namespace).await {
                Ok(items) => {
                    tracing::debug!(
                        "Listed {} {} via {}",
                        items.len(),
                        kind,
                        api_resource.api_version
                    );
                    return Ok(items);
                }
                Err(e) if is_not_found(&e) => {
                    tracing::debug!("{} not served at {}", kind, api_resource.api_version);
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to list {} in {}", kind, namespace));
                }
            }
        }
        anyhow::bail!("No served API version found for {}", kind)
    }

    /// List every source kind declared by a labelled CRD
    async fn list_sources(&self, namespace: &str) -> Result<Vec<Value>> {
        let crds: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let params = ListParams::default().labels(SOURCE_CRD_LABEL);
        let crds = crds
            .list(&params)
            .await
            .context("Failed to list source CRDs")?;

        let mut source_types: Vec<ApiResource> =
            crds.items.iter().filter_map(source_api_resource).collect();
        source_types.sort_by(|a, b| (&a.group, &a.kind).cmp(&(&b.group, &b.kind)));
        tracing::debug!("Discovered {} source kind(s)", source_types.len());

        let mut sources = Vec::new();
        for api_resource in &source_types {
            match self.list_resource(api_resource, namespace).await {
                Ok(items) => sources.extend(items),
                Err(e) => tracing::warn!(
                    "Failed to list {} in {}: {}",
                    api_resource.kind,
                    namespace,
                    e
                ),
            }
        }
        Ok(sources)
    }

    /// List one resource type, tagging each object with its type metadata
    async fn list_resource(
        &self,
        api_resource: &ApiResource,
        namespace: &str,
    ) -> Result<Vec<Value>, kube::Error> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, api_resource);
        let mut items = api.list(&ListParams::default()).await?.items;
        items.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));

        let mut values = Vec::with_capacity(items.len());
        for mut obj in items {
            // List responses leave the per-item type meta empty
            obj.types = Some(TypeMeta {
                api_version: api_resource.api_version.clone(),
                kind: api_resource.kind.clone(),
            });
            match serde_json::to_value(&obj) {
                Ok(value) => values.push(value),
                Err(e) => tracing::warn!(
                    "Failed to serialize {} {:?}: {}",
                    api_resource.kind,
                    obj.metadata.name,
                    e
                ),
            }
        }
        Ok(values)
    }
}

#[async_trait]
impl ResourceLister for KubeLister {
    async fn list(&self, kind: EventingKind, namespace: &str) -> Result<Vec<Value>> {
        match kind {
            EventingKind::Source => self.list_sources(namespace).await,
            _ => self.list_with_fallback(kind, namespace).await,
        }
    }

    fn describe(&self) -> String {
        "the Kubernetes API server".to_string()
    }
}

fn api_resource(coords: &KindCoordinates, kind: &str) -> ApiResource {
    ApiResource {
        group: coords.group.to_string(),
        version: coords.version.to_string(),
        api_version: format!("{}/{}", coords.group, coords.version),
        kind: kind.to_string(),
        plural: coords.plural.to_string(),
    }
}

/// Coordinates to list a source CRD's objects at
///
/// Uses the storage version, or the first served one when none is marked.
fn source_api_resource(crd: &CustomResourceDefinition) -> Option<ApiResource> {
    let spec = &crd.spec;
    let version = spec
        .versions
        .iter()
        .find(|v| v.storage)
        .or_else(|| spec.versions.iter().find(|v| v.served))?;

    Some(ApiResource {
        group: spec.group.clone(),
        version: version.name.clone(),
        api_version: format!("{}/{}", spec.group, version.name),
        kind: spec.names.kind.clone(),
        plural: spec.names.plural.clone(),
    })
}

/// Whether a list failed because the type is not served at that version
fn is_not_found(e: &kube::Error) -> bool {
    let error_string = e.to_string();
    error_string.contains("404") || error_string.contains("Not Found")
}
