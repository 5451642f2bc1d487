//! mqrag CLI
//!
//! Ask questions against a hosted vector corpus with LLM query expansion.

use anyhow::Result;
use clap::Parser;
use mqrag_core::error::exit_codes;
use mqrag_core::{Config, MqRagError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output only
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Ask(args) => commands::ask::run(args, config, cli.format, cli.verbose).await,
        Commands::Expand(args) => commands::expand::run(args, config, cli.format).await,
        Commands::Retrieve(args) => commands::retrieve::run(args, config, cli.format).await,
        Commands::Config => commands::config::run(&config, cli.format),
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<MqRagError>()
        .map(MqRagError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}
