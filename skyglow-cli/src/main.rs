//! Binary crate for the `skyglow` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod output;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_logging(cmd.verbose);
    cmd.run().await
}

/// `RUST_LOG` wins; otherwise `-v` turns on debug output for our crates.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "skyglow_core=debug,skyglow=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
