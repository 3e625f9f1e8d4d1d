//! CLI argument parsing and command dispatch

mod commands;
mod graph;
mod logging;
mod version;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use graph::{GraphSession, handle_dot, handle_list, handle_render, ownership_report};
pub use logging::init_logging;
pub use version::display_version;

use crate::render::OutputFormat;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kngraph - draw Knative eventing topology as a Graphviz graph
#[derive(Parser, Debug)]
#[command(name = "kngraph", version)]
#[command(
    about = "Draws Knative brokers, triggers, sources and channels as a Graphviz graph",
    long_about = None
)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Namespace to graph
    #[arg(long, short = 'n', global = true)]
    pub namespace: Option<String>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Read resources from manifest files instead of the cluster
    #[arg(long = "file", short = 'f', global = true)]
    pub files: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Main commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Print the graph as DOT
    Dot,
    /// Render the graph to an image with Graphviz
    Render {
        /// Image format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Output file (defaults to graph.<format> in the temp directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Write an HTML page embedding the image instead
        #[arg(long)]
        html: bool,
    },
    /// List eventing resources and their owners
    List,
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

/// Dispatch a parsed command line
pub async fn run(args: Args) -> Result<()> {
    let Args {
        namespace,
        context,
        files,
        command,
        ..
    } = args;

    match command {
        Command::Config { subcommand } => handle_config_command(subcommand),
        Command::Version => {
            display_version();
            Ok(())
        }
        Command::Dot => {
            let session =
                GraphSession::open(namespace.as_deref(), context.as_deref(), &files).await?;
            handle_dot(&session).await
        }
        Command::Render {
            format,
            output,
            html,
        } => {
            let session =
                GraphSession::open(namespace.as_deref(), context.as_deref(), &files).await?;
            handle_render(&session, format, output, html).await
        }
        Command::List => {
            let session =
                GraphSession::open(namespace.as_deref(), context.as_deref(), &files).await?;
            handle_list(&session).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_render() {
        let args = Args::try_parse_from([
            "kngraph", "-n", "events", "render", "--format", "svg", "-o", "/tmp/g.svg",
        ])
        .unwrap();
        assert_eq!(args.namespace.as_deref(), Some("events"));
        assert_eq!(
            args.command,
            Command::Render {
                format: Some(OutputFormat::Svg),
                output: Some(PathBuf::from("/tmp/g.svg")),
                html: false,
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["kngraph", "dot", "-f", "a.yaml", "-f", "b.yaml", "-d"]).unwrap();
        assert!(args.debug);
        assert_eq!(
            args.files,
            vec![PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]
        );
        assert_eq!(args.command, Command::Dot);
    }

    #[test]
    fn test_parse_config_set() {
        let args =
            Args::try_parse_from(["kngraph", "config", "set", "graph.rankdir", "TB"]).unwrap();
        assert_eq!(
            args.command,
            Command::Config {
                subcommand: ConfigSubcommand::Set {
                    key: "graph.rankdir".to_string(),
                    value: "TB".to_string(),
                }
            }
        );
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Args::try_parse_from(["kngraph", "render", "--format", "gif"]).is_err());
    }
}
