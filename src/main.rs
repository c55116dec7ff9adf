use clap::Parser;
use colored::*;
use std::process;

use cartosync::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging with CARTOSYNC_LOG environment variable support
    let log_level = std::env::var("CARTOSYNC_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<cartosync::CartosyncError>() {
            Some(cartosync::CartosyncError::Config(_)) => 2,
            Some(cartosync::CartosyncError::Io(_)) => 3,
            Some(cartosync::CartosyncError::Parse(_)) => 4,
            Some(cartosync::CartosyncError::Api { .. })
            | Some(cartosync::CartosyncError::Network(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::History(args) => cartosync::cli::history::run(args),
        Commands::Validate(args) => cartosync::cli::validate::run(args),
    }
}
