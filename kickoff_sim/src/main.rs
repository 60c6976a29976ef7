// kickoff_sim/src/main.rs

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kickoff_sim::cli::Cli;
use kickoff_sim::error::Result;
use kickoff_sim::run_path;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kickoff_sim=info,kickoff_core=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let reports = run_path(&cli.scenario, &cli.overrides())?;
    info!("Completed {} scenario(s)", reports.len());
    Ok(())
}
