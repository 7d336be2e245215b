//! Stencil engine CLI entrypoint.

use clap::Parser;

mod commands;
mod config;
mod demo;
mod handlers;

use commands::Commands;
use config::RuntimeConfig;

#[derive(Parser)]
#[command(name = "stencil")]
#[command(author, version, about = "Distributed stencil execution engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = RuntimeConfig::load().unwrap_or_default();

    match cli.command {
        Commands::Decompose { chain_length } => handlers::decompose_demo(&config, chain_length).await?,
        Commands::RunDemo { chain_length } => handlers::run_demo(&config, chain_length).await?,
        Commands::Validate { path } => handlers::validate(&path)?,
    }

    Ok(())
}
