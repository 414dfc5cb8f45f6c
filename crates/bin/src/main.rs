//! Ludex CLI entry point.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ludex=info".parse().unwrap()))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Register(args) => commands::register::run(args).await,
        Commands::Login(args) => commands::login::run(args).await,
        Commands::Logout(args) => commands::logout::run(args).await,
        Commands::Whoami(args) => commands::whoami::run(args).await,
        Commands::Profile(args) => commands::profile::run(args).await,
    }
}
