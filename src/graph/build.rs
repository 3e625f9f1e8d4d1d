//! Graph construction driver
//!
//! Lists every eventing kind in ingestion order and feeds each record to its
//! ingestor. Listing failures and malformed records are logged and skipped;
//! a broken model invariant aborts the build.

use super::ingest::{IngestError, ingest_value};
use super::model::{GraphError, GraphModel};
use crate::eventing::{EventingKind, ResourceHeader};
use crate::kube::ResourceLister;
use thiserror::Error;

/// Errors that abort graph construction
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// No kind could be listed at all; the source is unreachable
    #[error("could not list any eventing resources from {source_name}: {last_error}")]
    NothingListed {
        source_name: String,
        last_error: String,
    },
}

/// A record skipped during the build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub kind: EventingKind,
    pub name: String,
    pub reason: String,
}

/// What happened while building
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Records ingested successfully
    pub ingested: usize,
    pub skipped: Vec<SkippedRecord>,
    /// Kinds whose listing failed
    pub failed_kinds: Vec<EventingKind>,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed_kinds.is_empty()
    }
}

/// Build the graph of everything `lister` returns for `namespace`
pub async fn build_graph(
    lister: &dyn ResourceLister,
    namespace: &str,
) -> Result<(GraphModel, BuildReport), BuildError> {
    let mut model = GraphModel::new();
    let mut report = BuildReport::default();
    let mut last_error = None;

    tracing::debug!(
        "Building graph for namespace {} from {}",
        namespace,
        lister.describe()
    );

    for &kind in EventingKind::ingest_order() {
        let records = match lister.list(kind, namespace).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Failed to list {} in {}: {:#}", kind, namespace, e);
                report.failed_kinds.push(kind);
                last_error = Some(format!("{:#}", e));
                continue;
            }
        };
        tracing::debug!("Ingesting {} {} record(s)", records.len(), kind);

        for record in &records {
            match ingest_value(&mut model, kind, record) {
                Ok(()) => report.ingested += 1,
                Err(IngestError::Record(e)) => {
                    let name = ResourceHeader::from_value(record)
                        .metadata
                        .name
                        .unwrap_or_default();
                    tracing::warn!("Skipping {} '{}': {}", kind, name, e);
                    report.skipped.push(SkippedRecord {
                        kind,
                        name,
                        reason: e.to_string(),
                    });
                }
                Err(IngestError::Graph(e)) => return Err(e.into()),
            }
        }
    }

    if report.failed_kinds.len() == EventingKind::ingest_order().len() {
        return Err(BuildError::NothingListed {
            source_name: lister.describe(),
            last_error: last_error.unwrap_or_default(),
        });
    }

    tracing::info!(
        "Built graph with {} node(s) and {} edge(s) from {} record(s)",
        model.node_count(),
        model.edges().len(),
        report.ingested
    );
    Ok((model, report))
}
