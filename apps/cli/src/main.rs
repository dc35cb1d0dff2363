//! cavemark command line entry point.

mod cli;
mod commands;
mod config;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let env = config::Env::load(&std::env::current_dir()?);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(commands::dispatch(cli, env))
}
