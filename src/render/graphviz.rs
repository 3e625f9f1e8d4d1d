//! Graphviz subprocess adapter

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// File names the Graphviz layout executable goes by
#[cfg(windows)]
const DOT_EXECUTABLES: &[&str] = &["dot.exe", "dot"];
#[cfg(not(windows))]
const DOT_EXECUTABLES: &[&str] = &["dot"];

/// Errors raised while turning DOT into an image
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("graphviz executable not found: {0}")]
    NotFound(String),

    #[error("failed to run {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("graphviz exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("{0} output cannot be embedded in an HTML page")]
    NotEmbeddable(OutputFormat),
}

/// Image formats the renderer can produce
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    Pdf,
    Jpg,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Jpg => "jpg",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Jpg => "image/jpeg",
        }
    }

    /// Whether browsers display this format inline in an `<img>`
    pub fn is_embeddable(&self) -> bool {
        !matches!(self, OutputFormat::Pdf)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            "pdf" => Ok(OutputFormat::Pdf),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            _ => Err(format!(
                "Unknown output format: {}. Valid formats: png, svg, pdf, jpg",
                s
            )),
        }
    }
}

/// Runs the Graphviz `dot` executable
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    executable: PathBuf,
}

impl GraphvizRenderer {
    /// Use `configured` if given, otherwise search `PATH` for `dot`
    pub fn locate(configured: Option<&Path>) -> Result<Self, RenderError> {
        if let Some(path) = configured {
            if path.is_file() {
                return Ok(Self::with_executable(path));
            }
            return Err(RenderError::NotFound(path.display().to_string()));
        }

        let path_var = std::env::var_os("PATH").unwrap_or_default();
        std::env::split_paths(&path_var)
            .flat_map(|dir| DOT_EXECUTABLES.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
            .map(|path| Self::with_executable(path))
            .ok_or_else(|| RenderError::NotFound("'dot' is not on PATH".to_string()))
    }

    pub fn with_executable(path: impl Into<PathBuf>) -> Self {
        Self {
            executable: path.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Lay out `dot` and return the image bytes
    pub async fn render(&self, dot: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        tracing::debug!("Running {:?} -T{}", self.executable, format);
        let spawn_error = |source: std::io::Error| RenderError::Spawn {
            path: self.executable.clone(),
            source,
        };

        let mut child = Command::new(&self.executable)
            .arg(format!("-T{}", format))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        // stdin is fed from its own task while stdout is drained here
        let writer = child.stdin.take().map(|mut stdin| {
            let input = dot.to_owned();
            tokio::spawn(async move {
                let result = stdin.write_all(input.as_bytes()).await;
                drop(stdin);
                result
            })
        });

        let output = child.wait_with_output().await.map_err(spawn_error)?;
        if let Some(writer) = writer {
            match writer.await {
                Ok(Err(e)) => tracing::debug!("Graphviz closed stdin early: {}", e),
                Err(e) => tracing::warn!("Stdin writer task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }

        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        tracing::debug!("Graphviz produced {} byte(s)", output.stdout.len());
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("png".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("SVG".parse::<OutputFormat>(), Ok(OutputFormat::Svg));
        assert_eq!("jpeg".parse::<OutputFormat>(), Ok(OutputFormat::Jpg));
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_mime() {
        assert_eq!(OutputFormat::Png.mime(), "image/png");
        assert_eq!(OutputFormat::Svg.mime(), "image/svg+xml");
        assert!(!OutputFormat::Pdf.is_embeddable());
        assert!(OutputFormat::Jpg.is_embeddable());
    }

    #[test]
    fn test_locate_configured_missing() {
        let err = GraphvizRenderer::locate(Some(Path::new("/nonexistent/bin/dot"))).unwrap_err();
        assert!(matches!(err, RenderError::NotFound(_)));
    }

    #[test]
    fn test_locate_configured_present() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let renderer = GraphvizRenderer::locate(Some(file.path())).unwrap();
        assert_eq!(renderer.executable(), file.path());
    }

    #[cfg(unix)]
    fn script(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-dot");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_pipes_stdin_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = GraphvizRenderer::with_executable(script(&dir, "cat"));

        let bytes = renderer
            .render("digraph G {}\n", OutputFormat::Svg)
            .await
            .unwrap();
        assert_eq!(bytes, b"digraph G {}\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let renderer =
            GraphvizRenderer::with_executable(script(&dir, "echo \"bad format $1\" >&2; exit 3"));

        let err = renderer
            .render("digraph G {}", OutputFormat::Png)
            .await
            .unwrap_err();
        match err {
            RenderError::Failed { stderr, .. } => assert_eq!(stderr, "bad format -Tpng"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_render_missing_executable() {
        let renderer = GraphvizRenderer::with_executable("/nonexistent/bin/dot");
        let err = renderer
            .render("digraph G {}", OutputFormat::Png)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }));
    }
}
