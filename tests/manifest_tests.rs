//! Manifest file tests
//!
//! Graphs built from YAML and JSON manifests on disk.

use kngraph::graph::keys::{broker_key, trigger_key};
use kngraph::kube::FileLister;
use kngraph::{BuildError, DotOptions, build_graph, render_dot};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn manifest(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const BROKER: &str = r#"
apiVersion: eventing.knative.dev/v1
kind: Broker
metadata:
  name: default
  namespace: demo
status:
  address:
    url: http://broker-ingress.knative-eventing.svc.cluster.local/demo/default
"#;

const TRIGGERS: &str = r#"
apiVersion: eventing.knative.dev/v1
kind: Trigger
metadata:
  name: audit
  namespace: demo
spec:
  broker: default
  subscriber:
    uri: http://audit.demo.svc.cluster.local
---
apiVersion: eventing.knative.dev/v1
kind: Trigger
metadata:
  name: elsewhere
  namespace: other
spec:
  broker: default
  subscriber:
    uri: http://elsewhere.other.svc.cluster.local
"#;

#[tokio::test]
async fn test_graph_from_multiple_files() {
    // Triggers come first on the command line; ingestion order still holds
    let triggers = manifest(TRIGGERS);
    let broker = manifest(BROKER);
    let lister = FileLister::new(vec![
        triggers.path().to_path_buf(),
        broker.path().to_path_buf(),
    ]);

    let (model, report) = build_graph(&lister, "demo").await.unwrap();
    assert_eq!(report.ingested, 2);

    let trigger = model.node_by_key(&trigger_key("audit")).unwrap();
    assert_eq!(trigger.cluster, model.cluster_for(&broker_key("default")));
    assert!(model.node_by_key(&trigger_key("elsewhere")).is_none());

    let dot = render_dot(&model, &DotOptions::for_namespace("demo"));
    assert!(dot.contains("label=\"Triggers in demo\";"));
    assert!(dot.contains(
        "label=\"Broker default\\nhttp://broker-ingress.knative-eventing.svc.cluster.local/demo/default/\";"
    ));
}

#[tokio::test]
async fn test_json_list_manifest() {
    let list = manifest(
        r#"{
  "apiVersion": "v1",
  "kind": "List",
  "items": [
    {
      "apiVersion": "messaging.knative.dev/v1",
      "kind": "InMemoryChannel",
      "metadata": {"name": "orders"},
      "status": {"address": {"url": "http://orders-kn-channel.demo.svc.cluster.local"}}
    },
    {
      "apiVersion": "sources.knative.dev/v1",
      "kind": "PingSource",
      "metadata": {"name": "tick"},
      "status": {"sinkUri": "http://orders-kn-channel.demo.svc.cluster.local/"}
    }
  ]
}"#,
    );
    let lister = FileLister::new(vec![list.path().to_path_buf()]);

    let (model, _) = build_graph(&lister, "demo").await.unwrap();
    assert_eq!(model.node_count(), 2);
    assert_eq!(model.edges().len(), 1);

    let edge = &model.edges()[0];
    assert!(model.node(edge.from).label.starts_with("Source tick"));
    assert!(model.node(edge.to).label.starts_with("Channel orders"));
}

#[tokio::test]
async fn test_malformed_record_is_reported() {
    let file = manifest(
        r#"
apiVersion: messaging.knative.dev/v1
kind: Subscription
metadata:
  name: dangling
spec:
  subscriber:
    uri: http://svc.demo/
"#,
    );
    let lister = FileLister::new(vec![file.path().to_path_buf()]);

    let (model, report) = build_graph(&lister, "demo").await.unwrap();
    assert_eq!(model.node_count(), 0);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "dangling");
}

#[tokio::test]
async fn test_unreadable_manifest_fails_the_build() {
    let lister = FileLister::new(vec![PathBuf::from("/nonexistent/eventing.yaml")]);

    let err = build_graph(&lister, "demo").await.unwrap_err();
    assert!(matches!(err, BuildError::NothingListed { .. }));
}
