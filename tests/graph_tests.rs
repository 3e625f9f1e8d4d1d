//! Graph construction tests
//!
//! End-to-end checks of ingestion and DOT output through the public API.

use async_trait::async_trait;
use kngraph::graph::keys::{broker_key, trigger_key, uri_key};
use kngraph::graph::{NodeKind, ingest_value};
use kngraph::kube::ResourceLister;
use kngraph::{DotOptions, EventingKind, GraphModel, build_graph, render_dot};
use serde_json::{Value, json};
use std::collections::HashMap;

/// Lister serving a fixed set of records per kind
struct StaticLister {
    records: HashMap<EventingKind, Vec<Value>>,
}

impl StaticLister {
    fn new(records: Vec<(EventingKind, Value)>) -> Self {
        let mut by_kind: HashMap<EventingKind, Vec<Value>> = HashMap::new();
        for (kind, value) in records {
            by_kind.entry(kind).or_default().push(value);
        }
        Self { records: by_kind }
    }
}

#[async_trait]
impl ResourceLister for StaticLister {
    async fn list(&self, kind: EventingKind, _namespace: &str) -> anyhow::Result<Vec<Value>> {
        Ok(self.records.get(&kind).cloned().unwrap_or_default())
    }

    fn describe(&self) -> String {
        "static records".to_string()
    }
}

fn broker(name: &str, host: &str) -> Value {
    json!({
        "apiVersion": "eventing.knative.dev/v1",
        "kind": "Broker",
        "metadata": {"name": name, "namespace": "default"},
        "status": {"address": {"hostname": host}}
    })
}

fn uri_trigger(name: &str, broker: &str, subscriber: &str) -> Value {
    json!({
        "apiVersion": "eventing.knative.dev/v1alpha1",
        "kind": "Trigger",
        "metadata": {"name": name, "namespace": "default"},
        "spec": {"broker": broker, "subscriber": {"uri": subscriber}}
    })
}

/// Broker, channel, source, trigger and subscription wired together
fn event_mesh() -> Vec<(EventingKind, Value)> {
    vec![
        (
            EventingKind::Subscription,
            json!({
                "apiVersion": "messaging.knative.dev/v1",
                "kind": "Subscription",
                "metadata": {"name": "orders-sub"},
                "spec": {
                    "channel": {
                        "apiVersion": "messaging.knative.dev/v1",
                        "kind": "InMemoryChannel",
                        "name": "orders"
                    },
                    "subscriber": {"uri": "http://billing.default.svc.cluster.local/"}
                }
            }),
        ),
        (
            EventingKind::Trigger,
            json!({
                "apiVersion": "eventing.knative.dev/v1",
                "kind": "Trigger",
                "metadata": {"name": "display"},
                "spec": {
                    "broker": "default",
                    "filter": {"attributes": {"type": "dev.knative.sources.ping"}},
                    "subscriber": {
                        "ref": {
                            "apiVersion": "serving.knative.dev/v1",
                            "kind": "Service",
                            "name": "event-display"
                        }
                    }
                }
            }),
        ),
        (
            EventingKind::Source,
            json!({
                "apiVersion": "sources.knative.dev/v1",
                "kind": "PingSource",
                "metadata": {"name": "heartbeat"},
                "status": {"sinkUri": "http://default-broker.default.svc.cluster.local"}
            }),
        ),
        (
            EventingKind::Channel,
            json!({
                "apiVersion": "messaging.knative.dev/v1",
                "kind": "InMemoryChannel",
                "metadata": {"name": "orders"},
                "status": {"address": {"url": "http://orders-kn-channel.default.svc.cluster.local"}}
            }),
        ),
        (
            EventingKind::Broker,
            broker("default", "default-broker.default.svc.cluster.local"),
        ),
    ]
}

#[test]
fn test_broker_with_uri_trigger() {
    let mut model = GraphModel::new();
    ingest_value(
        &mut model,
        EventingKind::Broker,
        &broker("default", "broker-ingress.svc"),
    )
    .unwrap();
    ingest_value(
        &mut model,
        EventingKind::Trigger,
        &uri_trigger("t1", "default", "http://svc.default/"),
    )
    .unwrap();

    let clusters: Vec<_> = model.clusters().collect();
    assert_eq!(clusters.len(), 1);
    let (cluster_id, cluster) = clusters[0];
    assert_eq!(cluster.owner, broker_key("default"));

    let members: Vec<_> = model
        .cluster_members(cluster_id)
        .map(|(_, n)| n.key.clone())
        .collect();
    assert_eq!(members, vec![broker_key("default"), trigger_key("t1")]);

    let top_level: Vec<_> = model.top_level_nodes().collect();
    assert_eq!(top_level.len(), 1);
    assert_eq!(top_level[0].1.key, uri_key("http://svc.default/"));
    assert_eq!(top_level[0].1.kind, NodeKind::Subscriber);

    assert_eq!(model.edges().len(), 1);
    let edge = &model.edges()[0];
    assert_eq!(model.node(edge.from).key, trigger_key("t1"));
    assert_eq!(model.node(edge.to).key, uri_key("http://svc.default/"));
    assert_eq!(edge.label, "");
}

#[test]
fn test_trigger_with_missing_broker() {
    let mut model = GraphModel::new();
    ingest_value(
        &mut model,
        EventingKind::Trigger,
        &uri_trigger("t1", "missing", "http://svc.default/"),
    )
    .unwrap();

    let placeholders: Vec<_> = model
        .nodes()
        .filter(|(_, n)| n.label == "UnknownBroker missing")
        .collect();
    assert_eq!(placeholders.len(), 1);
    assert_eq!(placeholders[0].1.kind, NodeKind::Unknown);

    let trigger = model.node_by_key(&trigger_key("t1")).unwrap();
    assert_eq!(trigger.cluster, None);
    assert_eq!(model.clusters().count(), 0);
}

#[tokio::test]
async fn test_build_ingests_in_kind_order() {
    // Records are handed over newest-kind-first; the driver must reorder
    let lister = StaticLister::new(event_mesh());
    let (model, report) = build_graph(&lister, "default").await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.ingested, 5);

    let trigger = model.node_by_key(&trigger_key("display")).unwrap();
    assert!(trigger.cluster.is_some());
    assert!(
        model
            .nodes()
            .all(|(_, n)| !n.label.starts_with("UnknownBroker"))
    );

    let source_edge = model
        .edges()
        .iter()
        .find(|e| model.node(e.to).key == broker_key("default"))
        .unwrap();
    assert_eq!(
        source_edge.head_cluster,
        model.cluster_for(&broker_key("default"))
    );
}

#[tokio::test]
async fn test_output_is_deterministic() {
    let lister = StaticLister::new(event_mesh());
    let options = DotOptions::for_namespace("default");

    let (first, _) = build_graph(&lister, "default").await.unwrap();
    let (second, _) = build_graph(&lister, "default").await.unwrap();
    assert_eq!(render_dot(&first, &options), render_dot(&second, &options));
}

#[tokio::test]
async fn test_event_mesh_dot() {
    let lister = StaticLister::new(event_mesh());
    let (model, _) = build_graph(&lister, "default").await.unwrap();
    let dot = render_dot(&model, &DotOptions::for_namespace("default"));

    insta::assert_snapshot!(dot, @r#"
digraph G {
  label="Triggers in default";
  rankdir=LR;
  compound=true;

  subgraph cluster_0 {
    label="Broker default\nhttp://default-broker.default.svc.cluster.local/";
    n0 [label="Ingress", shape=oval];
    n3 [label="Trigger display\ntype:dev.knative.sources.ping", shape=box];
  }

  n1 [label="Channel orders\nKind: InMemoryChannel", shape=cds];
  n2 [label="Source heartbeat\nKind: PingSource\nsources.knative.dev/v1", shape=box];
  n4 [label="Subscriber event-display\nKind: Service\nserving.knative.dev/v1"];
  n5 [label="Subscriber http://billing.default.svc.cluster.local/"];

  n2 -> n0 [lhead=cluster_0];
  n3 -> n4 [label="type:dev.knative.sources.ping"];
  n1 -> n5 [label="Subscription orders-sub"];
}
"#);
}

#[tokio::test]
async fn test_source_with_unresolved_sink() {
    let lister = StaticLister::new(vec![(
        EventingKind::Source,
        json!({
            "apiVersion": "sources.knative.dev/v1",
            "kind": "ApiServerSource",
            "metadata": {"name": "k8s-events"},
            "status": {"sinkUri": "http://nowhere.default.svc"}
        }),
    )]);
    let (model, _) = build_graph(&lister, "default").await.unwrap();

    let sink = model
        .node_by_key(&uri_key("http://nowhere.default.svc/"))
        .unwrap();
    assert_eq!(sink.label, "UnknownSink http://nowhere.default.svc");
    assert_eq!(model.edges().len(), 1);
    assert_eq!(model.edges()[0].head_cluster, None);
}
