//! Event-flow graph
//!
//! Identity keys, the in-memory model, per-kind ingestors and the driver
//! that turns a listing into a [`GraphModel`].

mod build;
mod ingest;
pub mod keys;
mod model;

pub use build::{BuildError, BuildReport, SkippedRecord, build_graph};
pub use ingest::{Ingest, IngestError, ingest_value};
pub use keys::IdentityKey;
pub use model::{
    Cluster, ClusterId, Edge, GraphError, GraphModel, Node, NodeId, NodeKind, NodeTemplate,
};
