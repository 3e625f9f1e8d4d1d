//! Eventing resource kind definitions
//!
//! Centralized enum for the Knative eventing kinds the grapher understands,
//! together with the API coordinates used to list them.

use std::fmt;
use std::str::FromStr;

/// Group serving brokers and triggers (and channels/subscriptions in v1alpha1)
pub const EVENTING_GROUP: &str = "eventing.knative.dev";

/// Group serving channels and subscriptions since v1beta1
pub const MESSAGING_GROUP: &str = "messaging.knative.dev";

/// Label carried by every source CRD
pub const SOURCE_CRD_LABEL: &str = "eventing.knative.dev/source=true";

/// Enumeration of the eventing resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventingKind {
    Broker,
    Channel,
    Source,
    Trigger,
    Subscription,
}

/// API coordinates of one served version of a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindCoordinates {
    pub group: &'static str,
    pub version: &'static str,
    pub plural: &'static str,
}

const fn coords(
    group: &'static str,
    version: &'static str,
    plural: &'static str,
) -> KindCoordinates {
    KindCoordinates {
        group,
        version,
        plural,
    }
}

impl EventingKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EventingKind::Broker => "Broker",
            EventingKind::Channel => "Channel",
            EventingKind::Source => "Source",
            EventingKind::Trigger => "Trigger",
            EventingKind::Subscription => "Subscription",
        }
    }

    /// Try to parse a string into an EventingKind, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// All kinds, in declaration order
    pub fn all() -> &'static [Self] {
        &[
            EventingKind::Broker,
            EventingKind::Channel,
            EventingKind::Source,
            EventingKind::Trigger,
            EventingKind::Subscription,
        ]
    }

    /// The order kinds must be ingested in.
    ///
    /// Brokers and channels populate the address and cluster tables that
    /// sources, triggers and subscriptions look up.
    pub fn ingest_order() -> &'static [Self] {
        &[
            EventingKind::Broker,
            EventingKind::Channel,
            EventingKind::Source,
            EventingKind::Trigger,
            EventingKind::Subscription,
        ]
    }

    /// Candidate API coordinates, newest first.
    ///
    /// Sources have no fixed coordinates; they are discovered from CRDs.
    pub fn candidates(&self) -> &'static [KindCoordinates] {
        const BROKERS: &[KindCoordinates] = &[
            coords(EVENTING_GROUP, "v1", "brokers"),
            coords(EVENTING_GROUP, "v1beta1", "brokers"),
            coords(EVENTING_GROUP, "v1alpha1", "brokers"),
        ];
        const TRIGGERS: &[KindCoordinates] = &[
            coords(EVENTING_GROUP, "v1", "triggers"),
            coords(EVENTING_GROUP, "v1beta1", "triggers"),
            coords(EVENTING_GROUP, "v1alpha1", "triggers"),
        ];
        const CHANNELS: &[KindCoordinates] = &[
            coords(MESSAGING_GROUP, "v1", "channels"),
            coords(MESSAGING_GROUP, "v1beta1", "channels"),
            coords(EVENTING_GROUP, "v1alpha1", "channels"),
        ];
        const SUBSCRIPTIONS: &[KindCoordinates] = &[
            coords(MESSAGING_GROUP, "v1", "subscriptions"),
            coords(MESSAGING_GROUP, "v1beta1", "subscriptions"),
            coords(EVENTING_GROUP, "v1alpha1", "subscriptions"),
        ];

        match self {
            EventingKind::Broker => BROKERS,
            EventingKind::Trigger => TRIGGERS,
            EventingKind::Channel => CHANNELS,
            EventingKind::Subscription => SUBSCRIPTIONS,
            EventingKind::Source => &[],
        }
    }

    /// Classify a manifest by its apiVersion and kind
    ///
    /// Used when resources come from files rather than from the API server,
    /// where the kind cannot be inferred from the endpoint that was listed.
    pub fn classify(api_version: &str, kind: &str) -> Option<Self> {
        let group = api_version
            .rsplit_once('/')
            .map(|(group, _)| group)
            .unwrap_or("");
        let is_eventing = group == EVENTING_GROUP || group == MESSAGING_GROUP;

        match kind {
            "Broker" if group == EVENTING_GROUP => Some(EventingKind::Broker),
            "Trigger" if group == EVENTING_GROUP => Some(EventingKind::Trigger),
            "Subscription" if is_eventing => Some(EventingKind::Subscription),
            k if is_eventing && k.ends_with("Channel") => Some(EventingKind::Channel),
            k if group.ends_with("sources.knative.dev")
                || (group.contains("knative.dev") && k.ends_with("Source")) =>
            {
                Some(EventingKind::Source)
            }
            _ => None,
        }
    }

    /// Try to parse a string (case-insensitive) into an EventingKind
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "broker" | "brokers" | "br" => Some(EventingKind::Broker),
            "channel" | "channels" | "ch" => Some(EventingKind::Channel),
            "source" | "sources" | "src" => Some(EventingKind::Source),
            "trigger" | "triggers" | "tr" => Some(EventingKind::Trigger),
            "subscription" | "subscriptions" | "sub" => Some(EventingKind::Subscription),
            _ => None,
        }
    }
}

impl fmt::Display for EventingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Broker" => Ok(EventingKind::Broker),
            "Channel" => Ok(EventingKind::Channel),
            "Source" => Ok(EventingKind::Source),
            "Trigger" => Ok(EventingKind::Trigger),
            "Subscription" => Ok(EventingKind::Subscription),
            _ => Err(format!("Unknown eventing kind: {}", s)),
        }
    }
}
