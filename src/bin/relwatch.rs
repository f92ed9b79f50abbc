//! relwatch CLI - poll configured JSON endpoints and notify on new revisions
//!
//! Reads `config.yaml` from the data directory, processes every configured
//! event source, prints a results table and pushes ntfy notifications for
//! revisions not seen before.

use clap::Parser;
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use relwatch::runner::{run, RunOptions};

#[derive(Parser)]
#[command(name = "relwatch")]
#[command(version, about = "Poll JSON endpoints for new releases and push ntfy notifications", long_about = None)]
struct Cli {
    /// Write a crontab file for the configured schedule
    #[arg(short, long)]
    crontab: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Do not read or write saved state
    #[arg(short, long)]
    no_store: bool,

    /// Directory containing config.yaml and state.yaml
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "relwatch=debug"
    } else {
        "relwatch=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let opts = RunOptions {
        data_dir: cli.data_dir,
        no_store: cli.no_store,
        write_crontab: cli.crontab,
    };

    if let Err(e) = run(&opts).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
