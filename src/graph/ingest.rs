//! Resource ingestors
//!
//! Each record kind knows how to add itself to a [`GraphModel`]. Ingestors
//! always upsert a node (real or placeholder) before drawing an edge to it,
//! so a [`GraphError`] coming out of here means that rule was broken.

use super::keys::{self, IdentityKey};
use super::model::{GraphError, GraphModel, NodeId, NodeKind, NodeTemplate};
use crate::eventing::records::{Broker, Channel, Source, Subscription, Target, Trigger};
use crate::eventing::{EventingKind, RecordError, decode};
use serde_json::Value;
use thiserror::Error;

/// Why a single record could not be ingested
#[derive(Debug, Error)]
pub enum IngestError {
    /// The record is malformed; skip it and carry on
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The model invariant was violated; the run cannot continue
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// A record that can add itself to the graph
pub trait Ingest {
    fn ingest(&self, model: &mut GraphModel) -> Result<(), GraphError>;
}

/// Decode a raw object of `kind` and ingest it
pub fn ingest_value(
    model: &mut GraphModel,
    kind: EventingKind,
    value: &Value,
) -> Result<(), IngestError> {
    match kind {
        EventingKind::Broker => decode::<Broker>(value)?.ingest(model)?,
        EventingKind::Channel => decode::<Channel>(value)?.ingest(model)?,
        EventingKind::Source => decode::<Source>(value)?.ingest(model)?,
        EventingKind::Trigger => decode::<Trigger>(value)?.ingest(model)?,
        EventingKind::Subscription => decode::<Subscription>(value)?.ingest(model)?,
    }
    Ok(())
}

/// Upsert a node, taking over an existing placeholder under the same key
fn upsert_real(model: &mut GraphModel, key: IdentityKey, template: NodeTemplate) -> NodeId {
    let id = model.upsert_node(key, || template.clone());
    let node = model.node_mut(id);
    if node.kind.is_placeholder() {
        tracing::debug!("Replacing placeholder '{}' with '{}'", node.label, template.label);
        node.label = template.label;
        node.kind = template.kind;
    }
    id
}

/// Key and label for a delivery target
fn target_node(target: &Target, role: &str) -> (IdentityKey, NodeTemplate) {
    match target {
        Target::Uri(uri) => (
            keys::uri_key(uri),
            NodeTemplate::new(format!("{} {}", role, uri), NodeKind::Subscriber),
        ),
        Target::Ref(r) => (
            keys::ref_key(&r.api_version, &r.kind, &r.name),
            NodeTemplate::new(
                format!("{} {}\nKind: {}\n{}", role, r.name, r.kind, r.api_version),
                NodeKind::Subscriber,
            ),
        ),
    }
}

impl Ingest for Broker {
    fn ingest(&self, model: &mut GraphModel) -> Result<(), GraphError> {
        let name = self.metadata.name.as_deref().unwrap_or_default();
        let key = keys::broker_key(name);
        let address = self.address().map(|a| keys::normalize_address(&a));

        let id = upsert_real(
            model,
            key.clone(),
            NodeTemplate::new("Ingress", NodeKind::Ingress),
        );

        let title = match &address {
            Some(address) => format!("Broker {}\n{}", name, address),
            None => format!("Broker {}", name),
        };
        let cluster = model.ensure_cluster(&key, || title);
        model.place_in_cluster(id, cluster);

        match address {
            Some(address) => model.bind_address(&address, key),
            None => tracing::debug!("Broker {} has no ingress address yet", name),
        }
        Ok(())
    }
}

impl Ingest for Channel {
    fn ingest(&self, model: &mut GraphModel) -> Result<(), GraphError> {
        let name = self.metadata.name.as_deref().unwrap_or_default();
        let key = keys::channel_key(&self.kind, name);

        upsert_real(
            model,
            key.clone(),
            NodeTemplate::new(
                format!("Channel {}\nKind: {}", name, self.kind),
                NodeKind::Channel,
            ),
        );

        if let Some(address) = self.address() {
            model.bind_address(&address, key);
        }
        Ok(())
    }
}

impl Ingest for Source {
    fn ingest(&self, model: &mut GraphModel) -> Result<(), GraphError> {
        let name = self.metadata.name.as_deref().unwrap_or_default();
        let (group, version) = keys::split_api_version(&self.api_version);
        let key = keys::resource_key(group, version, &self.kind, name);

        upsert_real(
            model,
            key.clone(),
            NodeTemplate::new(
                format!(
                    "Source {}\nKind: {}\n{}",
                    name, self.kind, self.api_version
                ),
                NodeKind::Source,
            ),
        );

        let Some(sink) = self.sink_uri() else {
            return Ok(());
        };

        let resolved = model.resolve_address(sink).cloned();
        let sink_key = match resolved {
            Some(resolved) => resolved,
            None => {
                // Keyed by the normalized address, labelled with the raw one
                let sink = sink.trim();
                tracing::debug!("Source {} sinks to unknown address {}", name, sink);
                let unknown = keys::uri_key(sink);
                model.upsert_node(unknown.clone(), || {
                    NodeTemplate::new(format!("UnknownSink {}", sink), NodeKind::Unknown)
                });
                unknown
            }
        };

        let head_cluster = model.cluster_for(&sink_key);
        let edge = model.add_edge(&key, &sink_key, "")?;
        edge.head_cluster = head_cluster;
        Ok(())
    }
}

impl Ingest for Trigger {
    fn ingest(&self, model: &mut GraphModel) -> Result<(), GraphError> {
        let name = self.metadata.name.as_deref().unwrap_or_default();
        let broker = self.broker();
        let broker_key = keys::broker_key(broker);

        if !model.contains_node(&broker_key) {
            tracing::debug!("Trigger {} references unknown broker {}", name, broker);
            model.upsert_node(broker_key.clone(), || {
                NodeTemplate::new(format!("UnknownBroker {}", broker), NodeKind::Unknown)
            });
        }

        let key = keys::trigger_key(name);
        let base_label = format!("Trigger {}", name);
        let id = upsert_real(
            model,
            key.clone(),
            NodeTemplate::new(base_label.clone(), NodeKind::Trigger),
        );
        if let Some(cluster) = model.cluster_for(&broker_key) {
            model.place_in_cluster(id, cluster);
        }

        let filter = self.filter_text();
        if let Some(filter) = &filter {
            model.node_mut(id).label = format!("{}\n{}", base_label, filter);
        }

        match self.subscriber() {
            Some(target) => {
                let (sub_key, template) = target_node(&target, "Subscriber");
                model.upsert_node(sub_key.clone(), || template);
                model.add_edge(&key, &sub_key, filter.unwrap_or_default())?;
            }
            None => tracing::debug!("Trigger {} has no subscriber", name),
        }
        Ok(())
    }
}

impl Ingest for Subscription {
    fn ingest(&self, model: &mut GraphModel) -> Result<(), GraphError> {
        let name = self.metadata.name.as_deref().unwrap_or_default();
        // Decoding rejects subscriptions without a channel
        let Some(channel) = self.channel() else {
            return Ok(());
        };

        let channel_key = keys::ref_key(&channel.api_version, &channel.kind, &channel.name);
        if !model.contains_node(&channel_key) {
            tracing::debug!(
                "Subscription {} references unknown channel {}",
                name,
                channel.name
            );
            model.upsert_node(channel_key.clone(), || {
                NodeTemplate::new(format!("UnknownChannel {}", channel.name), NodeKind::Unknown)
            });
        }

        let mut upstream = channel_key;
        if let Some(target) = self.subscriber() {
            let (sub_key, template) = target_node(&target, "Subscriber");
            model.upsert_node(sub_key.clone(), || template);
            model.add_edge(&upstream, &sub_key, format!("Subscription {}", name))?;
            upstream = sub_key;
        }

        if let Some(target) = self.reply() {
            let (reply_key, template) = target_node(&target, "Reply");
            model.upsert_node(reply_key.clone(), || template);
            model.add_edge(&upstream, &reply_key, "reply")?;
        }
        Ok(())
    }
}
