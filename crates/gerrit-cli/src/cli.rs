//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::anonymize::AnonymizeArgs;
use crate::commands::fetch::FetchArgs;
use crate::commands::list::ListChangesArgs;
use crate::commands::reviewers::FetchReviewersArgs;

/// Gerrit change-fetching tool.
#[derive(Parser, Debug)]
#[command(name = "gerrit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch changes from a Gerrit server into local storage
    Fetch(FetchArgs),
    /// Fetch reviewer lists for already-stored changes
    FetchReviewers(FetchReviewersArgs),
    /// Print stored changes
    ListChanges(ListChangesArgs),
    /// Replace names and emails in a change snapshot with placeholders
    Anonymize(AnonymizeArgs),
}
