//! fgodata CLI - servant data extraction and validation

pub mod commands;
pub mod progress;

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use tracing::Level;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "fgodata")]
#[command(about = "fgodata: Fate/Grand Order servant data from the wiki", long_about = None)]
#[command(version)]
struct Cli {
    /// Set log level to debug
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ./fgodata.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Run the fgodata CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    tracing::debug!("config: {:?}", config);

    cli.command.execute(&config)?;

    Ok(())
}
