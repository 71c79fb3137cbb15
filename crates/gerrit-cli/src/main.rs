//! gerrit - CLI for bulk-fetching change data from a Gerrit server.
//!
//! This is a thin wrapper over the gretch crates, intended for pulling a
//! server's change history into local storage for offline analysis.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Fetch(args) => commands::fetch::run(args).await,
        Commands::FetchReviewers(args) => commands::reviewers::run(args).await,
        Commands::ListChanges(args) => commands::list::run(args).await,
        Commands::Anonymize(args) => commands::anonymize::run(args),
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}
