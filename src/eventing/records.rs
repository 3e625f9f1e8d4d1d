//! Typed eventing records
//!
//! Only the handful of fields needed to build the graph are modelled. Both the
//! v1alpha1 shapes (`hostname`, `dnsName`, `sourceAndType`) and the v1 shapes
//! (`url`, `uri`, `attributes`) are accepted.

use super::EventingKind;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// A record that could not be turned into a graph input
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to decode {kind} record: {source}")]
    Decode {
        kind: EventingKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} record is missing required field `{field}`")]
    MissingField {
        kind: EventingKind,
        field: &'static str,
    },
}

/// Common access to decoded records
pub trait EventingObject: DeserializeOwned {
    const KIND: EventingKind;

    fn metadata(&self) -> &ObjectMeta;

    /// Check the fields the identity key depends on
    fn validate(&self) -> Result<(), RecordError> {
        Ok(())
    }

    fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }
}

/// Decode a raw JSON object into a typed record
pub fn decode<T: EventingObject>(value: &Value) -> Result<T, RecordError> {
    let record = T::deserialize(value).map_err(|source| RecordError::Decode {
        kind: T::KIND,
        source,
    })?;

    if record.name().is_empty() {
        return Err(RecordError::MissingField {
            kind: T::KIND,
            field: "metadata.name",
        });
    }
    record.validate()?;

    Ok(record)
}

/// Addressable status (`status.address`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addressable {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Addressable {
    /// The raw ingress address, preferring the v1 `url`
    pub fn address(&self) -> Option<String> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return Some(url.to_string());
        }
        self.hostname
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(|h| format!("http://{}", h))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressableStatus {
    #[serde(default)]
    pub address: Option<Addressable>,
}

/// Reference to another object
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// A delivery destination: a literal endpoint or an object reference
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(default)]
    pub dns_name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default, rename = "ref")]
    pub reference: Option<ObjectReference>,
}

/// What a destination resolves to for graphing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Uri(String),
    Ref(ObjectReference),
}

impl Destination {
    /// Resolve the destination, literal endpoints first.
    ///
    /// A relative `uri` next to a `ref` only refines the referenced object's
    /// address, so the reference wins in that case.
    pub fn target(&self) -> Option<Target> {
        if let Some(dns) = self.dns_name.as_deref().filter(|d| !d.is_empty()) {
            return Some(Target::Uri(dns.to_string()));
        }
        let uri = self.uri.as_deref().filter(|u| !u.is_empty());
        if let Some(uri) = uri {
            if uri.contains("://") || self.reference.is_none() {
                return Some(Target::Uri(uri.to_string()));
            }
        }
        self.reference
            .as_ref()
            .filter(|r| !r.name.is_empty())
            .map(|r| Target::Ref(r.clone()))
    }
}

// ---------------------------------------------------------------------------
// Broker

#[derive(Debug, Clone, Deserialize)]
pub struct Broker {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: AddressableStatus,
}

impl Broker {
    pub fn address(&self) -> Option<String> {
        self.status.address.as_ref().and_then(Addressable::address)
    }
}

impl EventingObject for Broker {
    const KIND: EventingKind = EventingKind::Broker;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

// ---------------------------------------------------------------------------
// Channel

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: AddressableStatus,
}

impl Channel {
    pub fn address(&self) -> Option<String> {
        self.status.address.as_ref().and_then(Addressable::address)
    }
}

impl EventingObject for Channel {
    const KIND: EventingKind = EventingKind::Channel;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn validate(&self) -> Result<(), RecordError> {
        require_type_meta(Self::KIND, &self.api_version, &self.kind)
    }
}

// ---------------------------------------------------------------------------
// Source (duck typed)

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    #[serde(default)]
    pub sink_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: SourceStatus,
}

impl Source {
    pub fn sink_uri(&self) -> Option<&str> {
        self.status.sink_uri.as_deref().filter(|s| !s.is_empty())
    }
}

impl EventingObject for Source {
    const KIND: EventingKind = EventingKind::Source;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn validate(&self) -> Result<(), RecordError> {
        require_type_meta(Self::KIND, &self.api_version, &self.kind)
    }
}

// ---------------------------------------------------------------------------
// Trigger

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAndType {
    #[serde(default)]
    pub source: String,
    #[serde(default, rename = "type")]
    pub event_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerFilter {
    #[serde(default)]
    pub source_and_type: Option<SourceAndType>,
    #[serde(default)]
    pub attributes: Option<BTreeMap<String, String>>,
}

impl TriggerFilter {
    /// Human readable filter criteria, one criterion per line
    pub fn describe(&self) -> Option<String> {
        if let Some(st) = &self.source_and_type {
            return Some(format!("Source:{}\nType:{}", st.source, st.event_type));
        }
        self.attributes
            .as_ref()
            .filter(|attrs| !attrs.is_empty())
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|(k, v)| format!("{}:{}", k, v))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpec {
    #[serde(default)]
    pub broker: Option<String>,
    #[serde(default)]
    pub filter: Option<TriggerFilter>,
    #[serde(default)]
    pub subscriber: Option<Destination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Trigger {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: TriggerSpec,
}

/// Broker a trigger binds to when `spec.broker` is left empty
pub const DEFAULT_BROKER: &str = "default";

impl Trigger {
    pub fn broker(&self) -> &str {
        self.spec
            .broker
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BROKER)
    }

    pub fn filter_text(&self) -> Option<String> {
        self.spec.filter.as_ref().and_then(TriggerFilter::describe)
    }

    pub fn subscriber(&self) -> Option<Target> {
        self.spec.subscriber.as_ref().and_then(Destination::target)
    }
}

impl EventingObject for Trigger {
    const KIND: EventingKind = EventingKind::Trigger;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

// ---------------------------------------------------------------------------
// Subscription

/// Reply destination; v1alpha1 nests a channel reference, v1 is a destination
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default)]
    pub channel: Option<ObjectReference>,
    #[serde(flatten)]
    pub destination: Destination,
}

impl Reply {
    pub fn target(&self) -> Option<Target> {
        if let Some(channel) = self.channel.as_ref().filter(|c| !c.name.is_empty()) {
            return Some(Target::Ref(channel.clone()));
        }
        self.destination.target()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSpec {
    #[serde(default)]
    pub channel: Option<ObjectReference>,
    #[serde(default)]
    pub subscriber: Option<Destination>,
    #[serde(default)]
    pub reply: Option<Reply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: SubscriptionSpec,
}

impl Subscription {
    pub fn channel(&self) -> Option<&ObjectReference> {
        self.spec.channel.as_ref().filter(|c| !c.name.is_empty())
    }

    pub fn subscriber(&self) -> Option<Target> {
        self.spec.subscriber.as_ref().and_then(Destination::target)
    }

    pub fn reply(&self) -> Option<Target> {
        self.spec.reply.as_ref().and_then(Reply::target)
    }
}

impl EventingObject for Subscription {
    const KIND: EventingKind = EventingKind::Subscription;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn validate(&self) -> Result<(), RecordError> {
        match self.channel() {
            Some(_) => Ok(()),
            None => Err(RecordError::MissingField {
                kind: Self::KIND,
                field: "spec.channel",
            }),
        }
    }
}

fn require_type_meta(
    kind: EventingKind,
    api_version: &str,
    type_kind: &str,
) -> Result<(), RecordError> {
    if api_version.is_empty() {
        return Err(RecordError::MissingField {
            kind,
            field: "apiVersion",
        });
    }
    if type_kind.is_empty() {
        return Err(RecordError::MissingField { kind, field: "kind" });
    }
    Ok(())
}
