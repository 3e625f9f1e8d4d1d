//! DOT emission
//!
//! Walks a finished [`GraphModel`] and writes Graphviz DOT text. Output is
//! a pure function of the model, so identical models give identical bytes.

use crate::graph::{GraphModel, Node, NodeId, NodeKind};
use std::fmt::Write;

/// Rank directions Graphviz understands
pub const RANKDIRS: &[&str] = &["LR", "RL", "TB", "BT"];

/// Graph-level attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotOptions {
    pub title: String,
    pub rankdir: String,
}

impl DotOptions {
    /// Default options for a namespace
    pub fn for_namespace(namespace: &str) -> Self {
        Self {
            title: default_title(namespace),
            rankdir: "LR".to_string(),
        }
    }
}

/// Title used when none is configured
pub fn default_title(namespace: &str) -> String {
    format!("Triggers in {}", namespace)
}

/// Render `model` as a DOT digraph
pub fn render_dot(model: &GraphModel, options: &DotOptions) -> String {
    let mut out = String::new();
    out.push_str("digraph G {\n");
    // Writing into a String cannot fail
    let _ = writeln!(out, "  label={};", quote(&options.title));
    let _ = writeln!(out, "  rankdir={};", options.rankdir);
    out.push_str("  compound=true;\n");

    for (cluster_id, cluster) in model.clusters() {
        out.push('\n');
        let _ = writeln!(out, "  subgraph cluster_{} {{", cluster_id.index());
        let _ = writeln!(out, "    label={};", quote(&cluster.title));
        for (id, node) in model.cluster_members(cluster_id) {
            write_node(&mut out, "    ", id, node);
        }
        out.push_str("  }\n");
    }

    let mut top_level = model.top_level_nodes().peekable();
    if top_level.peek().is_some() {
        out.push('\n');
    }
    for (id, node) in top_level {
        write_node(&mut out, "  ", id, node);
    }

    if !model.edges().is_empty() {
        out.push('\n');
    }
    for edge in model.edges() {
        let mut attrs = Vec::new();
        if !edge.label.is_empty() {
            attrs.push(format!("label={}", quote(&edge.label)));
        }
        if let Some(cluster) = edge.head_cluster {
            attrs.push(format!("lhead=cluster_{}", cluster.index()));
        }

        let _ = write!(out, "  n{} -> n{}", edge.from.index(), edge.to.index());
        if !attrs.is_empty() {
            let _ = write!(out, " [{}]", attrs.join(", "));
        }
        out.push_str(";\n");
    }

    out.push_str("}\n");
    out
}

fn write_node(out: &mut String, indent: &str, id: NodeId, node: &Node) {
    let mut attrs = vec![format!("label={}", quote(&node.label))];
    match node.kind {
        NodeKind::Ingress => attrs.push("shape=oval".to_string()),
        NodeKind::Source | NodeKind::Trigger => attrs.push("shape=box".to_string()),
        NodeKind::Channel => attrs.push("shape=cds".to_string()),
        NodeKind::Unknown => attrs.push("style=dashed".to_string()),
        NodeKind::Subscriber => {}
    }
    let _ = writeln!(out, "{}n{} [{}];", indent, id.index(), attrs.join(", "));
}

/// Quote a DOT string, escaping quotes and backslashes and turning line
/// breaks into `\n`
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => {}
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
