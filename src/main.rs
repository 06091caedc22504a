//! FloorGraph
//!
//! Indoor navigation graph editor for multi-floor buildings.
//!
//! This is the command-line entry point.

use clap::Parser;
use floorgraph_cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    tracing::debug!("floorgraph {}", floorgraph_cli::VERSION);
    floorgraph_cli::run(cli)
}
