//! Harbor shell
//!
//! Reads bridge messages as JSON lines on stdin and writes outbound
//! commands as JSON lines on stdout. Logs go to stderr.

mod io;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc::unbounded_channel;

use harbor_core::{Config, Shell};

#[derive(Debug, Parser)]
#[command(name = "harbor", version, about = "Browser shell coordination core")]
struct Cli {
    /// Log a diagnostics line after every processed event
    #[arg(long)]
    debug: bool,

    /// Config file (defaults to harbor.json in the data directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    harbor_core::init_logging(cli.debug);

    let config = Config::load(cli.config.as_deref());
    let (outbound_tx, outbound_rx) = unbounded_channel();
    let (inbound_tx, inbound_rx) = unbounded_channel();

    let shell = Shell::new(&config, outbound_tx, cli.debug).context("failed to start shell")?;

    let writer = tokio::spawn(io::write_outbound(outbound_rx));
    let reader = tokio::spawn(io::read_inbound(inbound_tx));

    // Returns once stdin is exhausted; dropping the shell closes the outbound side.
    shell.run(inbound_rx).await;

    reader.await.context("stdin reader panicked")??;
    writer.await.context("stdout writer panicked")??;

    tracing::info!("Harbor stopped");
    Ok(())
}
