//! Identity keys for graph bookkeeping
//!
//! Every addressable entity is reduced to a lower-cased, slash-joined key:
//!
//! - resources: `group/version/kind/name`
//! - literal endpoints: `uri/<normalized uri>`
//! - object references: `apiVersion/kind/name`
//!
//! Brokers and triggers are keyed under a fixed eventing segment so that a
//! broker and a trigger with the same name never collide, and so that a
//! reference to a broker lands on the same key as the broker itself.
//! Channels are keyed by kind and name only: `channel/kind/name`.

use crate::eventing::{EVENTING_GROUP, EventingKind};
use std::fmt;
use url::Url;

/// Version segment used for the well-known eventing kinds
const EVENTING_KEY_VERSION: &str = "v1alpha1";

/// Kinds keyed under the fixed eventing segment
const WELL_KNOWN_KINDS: &[&str] = &["broker", "trigger"];

/// Normalized identity of a graph entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key for a resource coordinate
pub fn resource_key(group: &str, version: &str, kind: &str, name: &str) -> IdentityKey {
    IdentityKey(format!("{}/{}/{}/{}", group, version, kind, name).to_lowercase())
}

/// Key for a literal network endpoint
pub fn uri_key(uri: &str) -> IdentityKey {
    IdentityKey(format!("uri/{}", normalize_address(uri)).to_lowercase())
}

/// Key for an object reference
///
/// References to brokers, triggers and channels collapse onto `broker_key`,
/// `trigger_key` and `channel_key` whatever version they name.
pub fn ref_key(api_version: &str, kind: &str, name: &str) -> IdentityKey {
    if EventingKind::classify(api_version, kind) == Some(EventingKind::Channel) {
        return channel_key(kind, name);
    }
    let (group, _) = split_api_version(api_version);
    let kind_lower = kind.to_lowercase();
    if group.eq_ignore_ascii_case(EVENTING_GROUP) && WELL_KNOWN_KINDS.contains(&kind_lower.as_str())
    {
        return eventing_key(&kind_lower, name);
    }
    IdentityKey(format!("{}/{}/{}", api_version, kind, name).to_lowercase())
}

pub fn broker_key(name: &str) -> IdentityKey {
    eventing_key("broker", name)
}

pub fn trigger_key(name: &str) -> IdentityKey {
    eventing_key("trigger", name)
}

/// Key for a channel of any implementation
///
/// Channels have been served from both the eventing and messaging groups,
/// so neither group nor version is part of the key.
pub fn channel_key(kind: &str, name: &str) -> IdentityKey {
    IdentityKey(format!("channel/{}/{}", kind, name).to_lowercase())
}

fn eventing_key(kind: &str, name: &str) -> IdentityKey {
    resource_key(EVENTING_GROUP, EVENTING_KEY_VERSION, kind, name)
}

/// Split `group/version` into its parts; core resources have an empty group
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.rsplit_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

/// Canonical form of a network address
///
/// Scheme and host are lower-cased and the path always ends with `/`, so
/// `HTTP://Svc.Default` and `http://svc.default/` are the same address.
/// Strings that do not parse as URLs only get the trailing slash.
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    match Url::parse(trimmed) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            url.to_string()
        }
        _ => {
            if trimmed.ends_with('/') {
                trimmed.to_string()
            } else {
                format!("{}/", trimmed)
            }
        }
    }
}
