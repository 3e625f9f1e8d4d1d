//! kngraph - Knative eventing topology grapher
//!
//! Lists eventing resources from a cluster (or manifest files), links them
//! into a graph and prints it as DOT or renders it with Graphviz.

use anyhow::Result;
use clap::Parser;
use kngraph::cli::{self, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    cli::init_logging(args.debug);
    cli::run(args).await
}
