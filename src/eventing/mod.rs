//! Knative eventing resource model
//!
//! Kinds, their API coordinates, and the typed records decoded from the raw
//! objects a lister returns.

mod kinds;
pub mod records;

pub use kinds::{
    EVENTING_GROUP, EventingKind, KindCoordinates, MESSAGING_GROUP, SOURCE_CRD_LABEL,
};
pub use records::{
    Broker, Channel, Destination, EventingObject, ObjectReference, RecordError, Source,
    Subscription, Target, Trigger, decode,
};

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Deserialize;
use serde_json::Value;

/// Type and object metadata shared by every resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHeader {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
}

impl ResourceHeader {
    /// Read the header of a raw object, tolerating anything missing
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    /// One line per owner, or a single line for unowned resources
    pub fn ownership_lines(&self, fallback_kind: EventingKind) -> Vec<String> {
        let kind = if self.kind.is_empty() {
            fallback_kind.as_str()
        } else {
            self.kind.as_str()
        };
        let name = self.metadata.name.as_deref().unwrap_or("<unnamed>");

        match self.metadata.owner_references.as_deref() {
            Some(owners) if !owners.is_empty() => owners
                .iter()
                .map(|o| {
                    format!(
                        "{} {} - owned by {} {} {}",
                        kind, name, o.name, o.kind, o.api_version
                    )
                })
                .collect(),
            _ => vec![format!("{} {}", kind, name)],
        }
    }
}
