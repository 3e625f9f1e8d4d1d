//! kngraph library
//!
//! Builds a graph of Knative eventing resources (brokers, triggers, sources,
//! channels and subscriptions) and renders it with Graphviz. Used both by
//! the binary and by the integration tests.

pub mod cli;
pub mod config;
pub mod eventing;
pub mod graph;
pub mod kube;
pub mod render;

// Re-export commonly used types for convenience
pub use eventing::EventingKind;
pub use graph::{BuildError, BuildReport, GraphModel, build_graph};
pub use render::{DotOptions, render_dot};
