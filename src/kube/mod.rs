//! Kubernetes access
//!
//! Client construction and the [`ResourceLister`] implementations that feed
//! the graph builder: one backed by the API server, one by manifest files.
//!
//! Proxies are honoured through the standard `HTTPS_PROXY` / `HTTP_PROXY`
//! variables and any `proxy-url` set in the kubeconfig.

mod cluster;
mod lister;
mod manifest;

pub use cluster::KubeLister;
pub use lister::ResourceLister;
#[cfg(test)]
pub use lister::MockResourceLister;
pub use manifest::FileLister;

use anyhow::{Context, Result};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};

/// Namespace used when neither flags, config nor kubeconfig name one
pub const FALLBACK_NAMESPACE: &str = "default";

/// Resolve the client configuration
///
/// Without a context this follows the usual inference order: in-cluster
/// config, then `KUBECONFIG`, then `~/.kube/config`. With a context the
/// kubeconfig is read and that context selected.
pub async fn load_config(context: Option<&str>) -> Result<Config> {
    match context {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("Failed to load kubeconfig context '{}'", context))
        }
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration"),
    }
}

/// Build a client from a resolved configuration
pub fn create_client(config: Config) -> Result<Client> {
    tracing::debug!("Connecting to cluster at {}", config.cluster_url);
    Client::try_from(config).context("Failed to create Kubernetes client")
}
