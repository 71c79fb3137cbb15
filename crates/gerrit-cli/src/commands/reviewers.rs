//! Fetch-reviewers command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gretch_core::{RefetchPolicy, fetch_reviewers};
use gretch_store::DirStore;

use crate::commands::client_for;
use crate::output;

#[derive(Args, Debug)]
pub struct FetchReviewersArgs {
    /// Gerrit server base URL
    #[arg(long)]
    pub url: String,

    /// Directory store holding previously fetched changes
    #[arg(long)]
    pub store: PathBuf,

    /// Username for the authenticated REST namespace
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// HTTP password or token, paired with --username
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Refetch reviewer lists that are already stored
    #[arg(long)]
    pub refetch: bool,
}

pub async fn run(args: FetchReviewersArgs) -> Result<()> {
    let client = client_for(&args.url, args.username.as_deref(), args.password.as_deref())?;
    let store = DirStore::new(&args.store);

    let policy = if args.refetch {
        RefetchPolicy::AlwaysRefetch
    } else {
        RefetchPolicy::SkipIfPresent
    };

    let summary = fetch_reviewers(&client, &store, policy)
        .await
        .context("Failed to fetch reviewers")?;

    output::success(&format!(
        "Reviewer lists fetched for {} changes",
        summary.fetched
    ));
    if summary.skipped > 0 {
        output::field("Already present", &summary.skipped.to_string());
    }
    if summary.failed > 0 {
        output::warn(&format!("{} changes failed; see the logs", summary.failed));
    }
    Ok(())
}
