//! Graph command handlers: `dot`, `render` and `list`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigLoader, default_output_path, resolve_namespace};
use crate::eventing::{EventingKind, ResourceHeader};
use crate::graph::{BuildReport, build_graph};
use crate::kube::{self, FileLister, KubeLister, ResourceLister};
use crate::render::{
    DotOptions, GraphvizRenderer, OutputFormat, default_title, render_dot, render_html,
};

/// Where resources come from and which namespace to read
pub struct GraphSession {
    pub lister: Box<dyn ResourceLister>,
    pub namespace: String,
    pub config: Config,
}

impl GraphSession {
    /// Resolve configuration, pick a lister and settle the namespace
    ///
    /// Manifest files take the place of the cluster when given; the
    /// kubeconfig is then never read.
    pub async fn open(
        namespace: Option<&str>,
        context: Option<&str>,
        files: &[PathBuf],
    ) -> Result<Self> {
        let config = ConfigLoader::load().context("Failed to load configuration")?;

        let lister: Box<dyn ResourceLister>;
        let mut kube_namespace = None;
        if files.is_empty() {
            let kube_config = kube::load_config(context).await?;
            kube_namespace = Some(kube_config.default_namespace.clone());
            lister = Box::new(KubeLister::new(kube::create_client(kube_config)?));
        } else {
            if context.is_some() {
                tracing::warn!("--context is ignored when reading manifest files");
            }
            lister = Box::new(FileLister::new(files.to_vec()));
        }

        let namespace = resolve_namespace(namespace, &config, kube_namespace.as_deref());
        tracing::debug!("Using namespace {}", namespace);

        Ok(Self {
            lister,
            namespace,
            config,
        })
    }

    pub fn dot_options(&self) -> DotOptions {
        DotOptions {
            title: self
                .config
                .graph
                .title
                .clone()
                .unwrap_or_else(|| default_title(&self.namespace)),
            rankdir: self.config.graph.rankdir.clone(),
        }
    }

    /// Build the graph and emit DOT
    pub async fn dot(&self) -> Result<String> {
        let (model, report) = build_graph(self.lister.as_ref(), &self.namespace)
            .await
            .with_context(|| format!("Failed to build graph for {}", self.namespace))?;
        summarize(&report);
        Ok(render_dot(&model, &self.dot_options()))
    }
}

/// `dot`: print DOT to stdout
pub async fn handle_dot(session: &GraphSession) -> Result<()> {
    print!("{}", session.dot().await?);
    Ok(())
}

/// `render`: run Graphviz and write the image or HTML page
pub async fn handle_render(
    session: &GraphSession,
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
    html: bool,
) -> Result<()> {
    let renderer_config = &session.config.renderer;
    let format = format.unwrap_or(renderer_config.format);
    let output = output
        .or_else(|| renderer_config.output.clone())
        .unwrap_or_else(|| default_output_path(format, html));

    // Fail before listing anything if Graphviz is missing
    let renderer = GraphvizRenderer::locate(renderer_config.dot_path.as_deref())?;
    let dot = session.dot().await?;
    let image = renderer.render(&dot, format).await?;

    let bytes = if html {
        render_html(&image, format, &session.dot_options().title)?.into_bytes()
    } else {
        image
    };
    write_output(&output, &bytes).await?;
    println!("{}", output.display());
    Ok(())
}

/// `list`: print every eventing resource with its owners
pub async fn handle_list(session: &GraphSession) -> Result<()> {
    for line in ownership_report(session.lister.as_ref(), &session.namespace).await {
        println!("{}", line);
    }
    Ok(())
}

/// One line per resource and owner, in ingestion order
pub async fn ownership_report(lister: &dyn ResourceLister, namespace: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for &kind in EventingKind::ingest_order() {
        match lister.list(kind, namespace).await {
            Ok(records) => {
                for record in &records {
                    lines.extend(ResourceHeader::from_value(record).ownership_lines(kind));
                }
            }
            Err(e) => tracing::warn!("Failed to list {} in {}: {:#}", kind, namespace, e),
        }
    }
    lines
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn summarize(report: &BuildReport) {
    if report.is_complete() {
        return;
    }
    tracing::warn!(
        "Graph is incomplete: {} record(s) skipped, {} kind(s) could not be listed",
        report.skipped.len(),
        report.failed_kinds.len()
    );
}
