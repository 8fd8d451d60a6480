//! `hub-cli` entry point.

use anyhow::Result;
use clap::Parser;
use hub_cli::{cli::Cli, commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Default to info-level logs; override via RUST_LOG if needed.
    let _log_guard = community_hub_runtime::init_tracing("info")?;

    let cli = Cli::parse();
    tracing::debug!("hub-cli {}", env!("CARGO_PKG_VERSION"));
    commands::run(cli).await
}
