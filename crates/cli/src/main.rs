//! solve-provision - Command-line interface for solve provisioning
//!
//! Usage:
//!   solve-provision init [path]              - Write an example network manifest
//!   solve-provision plan <manifest>          - Show what a run would do
//!   solve-provision run <manifest> [--runs N] - Provision against simulated chains

mod commands;

use clap::{Parser, Subcommand};
use commands::{InitCommand, PlanCommand, RunCommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "solve-provision")]
#[command(about = "Idempotent multi-chain deployment of solve contracts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every deployed artifact (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example network manifest
    Init(InitCommand),
    /// Show the deployments and setup tasks of a run
    Plan(PlanCommand),
    /// Provision a network
    Run(RunCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Init(cmd) => cmd.run(),
        Commands::Plan(cmd) => cmd.run(),
        Commands::Run(cmd) => cmd.run().await,
    }
}
