use anyhow::{Context, Result};
use clap::Parser;
use leafscan_cli::args::Args;
use leafscan_cli::cli::Cli;

fn main() -> Result<()> {
    let args = Args::parse();
    let cli = Cli::new(args);

    // Create the tokio runtime and execute the cli
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to initialize runtime")?
        .block_on(cli.exec())
}
