//! List-changes command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gretch_core::traits::ChangeStore;
use gretch_store::DirStore;

use crate::output;

#[derive(Args, Debug)]
pub struct ListChangesArgs {
    /// Directory store to read
    #[arg(long)]
    pub store: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: ListChangesArgs) -> Result<()> {
    let store = DirStore::new(&args.store);
    let changes = store
        .all_changes()
        .await
        .context("Failed to read the change store")?;

    if changes.is_empty() {
        eprintln!("{}", "No changes found.".dimmed());
        return Ok(());
    }

    for change in &changes {
        if args.pretty {
            output::json_pretty(change)?;
        } else {
            output::json(change)?;
        }
    }

    eprintln!();
    eprintln!("{}: {}", "Total".dimmed(), changes.len());
    Ok(())
}
