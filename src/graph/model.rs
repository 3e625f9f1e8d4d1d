//! In-memory graph model
//!
//! Nodes, clusters and edges are stored in insertion order so that emitting
//! the same model twice yields the same text. Hash maps are only used as
//! lookup indexes next to the ordered storage.

use super::keys::{IdentityKey, normalize_address};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by graph mutations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// An edge endpoint was never upserted
    #[error("edge {from} -> {to} references unknown node {missing}")]
    UnknownNode {
        from: IdentityKey,
        to: IdentityKey,
        missing: IdentityKey,
    },
}

/// Position of a node in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Position of a cluster in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterId(usize);

impl ClusterId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a node stands for; selects its shape and style when emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Broker ingress
    Ingress,
    Channel,
    Source,
    Trigger,
    /// Something events are delivered to that is not itself graphed
    Subscriber,
    /// Stand-in for a referenced resource that was never listed
    Unknown,
}

impl NodeKind {
    /// Whether a real resource arriving later may take this node over
    pub fn is_placeholder(&self) -> bool {
        matches!(self, NodeKind::Subscriber | NodeKind::Unknown)
    }
}

/// Label and kind a new node is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTemplate {
    pub label: String,
    pub kind: NodeKind,
}

impl NodeTemplate {
    pub fn new(label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }
}

/// A vertex of the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub key: IdentityKey,
    pub label: String,
    pub kind: NodeKind,
    /// Owning cluster, `None` for the top level
    pub cluster: Option<ClusterId>,
}

/// A directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Empty when the edge carries no label
    pub label: String,
    /// Cluster the arrow head should be clipped to
    pub head_cluster: Option<ClusterId>,
}

/// A visual grouping owned by one identity key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub owner: IdentityKey,
    pub title: String,
}

/// The graph built from one snapshot of eventing resources
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    node_index: HashMap<IdentityKey, NodeId>,
    clusters: Vec<Cluster>,
    cluster_index: HashMap<IdentityKey, ClusterId>,
    addresses: HashMap<String, IdentityKey>,
    edges: Vec<Edge>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the node stored under `key`, creating it from `template` first
    /// if there is none. The template is only evaluated on creation.
    pub fn upsert_node<F>(&mut self, key: IdentityKey, template: F) -> NodeId
    where
        F: FnOnce() -> NodeTemplate,
    {
        if let Some(id) = self.node_index.get(&key) {
            return *id;
        }

        let NodeTemplate { label, kind } = template();
        let id = NodeId(self.nodes.len());
        tracing::trace!("Adding node {} ({:?}) for {}", id.0, kind, key);
        self.nodes.push(Node {
            key: key.clone(),
            label,
            kind,
            cluster: None,
        });
        self.node_index.insert(key, id);
        id
    }

    pub fn contains_node(&self, key: &IdentityKey) -> bool {
        self.node_index.contains_key(key)
    }

    pub fn node_id(&self, key: &IdentityKey) -> Option<NodeId> {
        self.node_index.get(key).copied()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn node_by_key(&self, key: &IdentityKey) -> Option<&Node> {
        self.node_id(key).map(|id| self.node(id))
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes that belong to no cluster, in insertion order
    pub fn top_level_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes().filter(|(_, n)| n.cluster.is_none())
    }

    /// Members of `cluster`, in insertion order
    pub fn cluster_members(&self, cluster: ClusterId) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes().filter(move |(_, n)| n.cluster == Some(cluster))
    }

    /// Append an edge between two existing nodes
    pub fn add_edge(
        &mut self,
        from: &IdentityKey,
        to: &IdentityKey,
        label: impl Into<String>,
    ) -> Result<&mut Edge, GraphError> {
        let unknown = |missing: &IdentityKey| GraphError::UnknownNode {
            from: from.clone(),
            to: to.clone(),
            missing: missing.clone(),
        };
        let from_id = self.node_id(from).ok_or_else(|| unknown(from))?;
        let to_id = self.node_id(to).ok_or_else(|| unknown(to))?;

        self.edges.push(Edge {
            from: from_id,
            to: to_id,
            label: label.into(),
            head_cluster: None,
        });
        let last = self.edges.len() - 1;
        Ok(&mut self.edges[last])
    }

    /// All edges in append order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Return the cluster owned by `owner`, creating it on first request
    pub fn ensure_cluster<F>(&mut self, owner: &IdentityKey, title: F) -> ClusterId
    where
        F: FnOnce() -> String,
    {
        if let Some(id) = self.cluster_index.get(owner) {
            return *id;
        }

        let id = ClusterId(self.clusters.len());
        self.clusters.push(Cluster {
            owner: owner.clone(),
            title: title(),
        });
        self.cluster_index.insert(owner.clone(), id);
        id
    }

    pub fn cluster_for(&self, owner: &IdentityKey) -> Option<ClusterId> {
        self.cluster_index.get(owner).copied()
    }

    pub fn cluster(&self, id: ClusterId) -> &Cluster {
        &self.clusters[id.0]
    }

    pub fn cluster_mut(&mut self, id: ClusterId) -> &mut Cluster {
        &mut self.clusters[id.0]
    }

    /// All clusters in creation order
    pub fn clusters(&self) -> impl Iterator<Item = (ClusterId, &Cluster)> {
        self.clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (ClusterId(i), c))
    }

    /// Move a node into a cluster; a node is never in two places
    pub fn place_in_cluster(&mut self, node: NodeId, cluster: ClusterId) {
        self.nodes[node.0].cluster = Some(cluster);
    }

    /// Record that `address` terminates at the node keyed `key`
    pub fn bind_address(&mut self, address: &str, key: IdentityKey) {
        self.addresses.insert(normalize_address(address), key);
    }

    pub fn resolve_address(&self, address: &str) -> Option<&IdentityKey> {
        self.addresses.get(&normalize_address(address))
    }
}
