//! Fetch command implementation.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use tracing::debug;

use gretch_core::{ChangeQuery, FetchOptions, FetchSummary, fetch_changes};
use gretch_store::{DirStore, JsonFileSink};

use crate::commands::client_for;
use crate::output;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Gerrit server base URL
    #[arg(long)]
    pub url: String,

    /// Directory store to upsert changes into, keyed by change id
    #[arg(long, conflicts_with = "out")]
    pub store: Option<PathBuf>,

    /// JSON snapshot file to write instead of a directory store
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Username for the authenticated REST namespace
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// HTTP password or token, paired with --username
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Stop after this many changes
    #[arg(long)]
    pub count: Option<usize>,

    /// Records per page request and per persisted batch
    #[arg(long, default_value_t = 500)]
    pub batch_size: usize,

    /// Continuation key to start the listing from
    #[arg(long)]
    pub start_at: Option<String>,

    /// Change status filter
    #[arg(long, default_value = "merged")]
    pub status: String,
}

pub async fn run(args: FetchArgs) -> Result<()> {
    let client = client_for(&args.url, args.username.as_deref(), args.password.as_deref())?;

    let options = FetchOptions {
        query: ChangeQuery::default()
            .status(&args.status)
            .page_size(args.batch_size),
        batch_size: args.batch_size,
        start_at: args.start_at.clone(),
        max_records: args.count,
    };
    debug!(?options, "fetch configured");

    let summary = match (&args.store, &args.out) {
        (Some(root), None) => {
            let mut sink = DirStore::new(root);
            fetch_changes(&client, &mut sink, options).await
        }
        (None, Some(path)) => {
            let mut sink = JsonFileSink::new(path);
            fetch_changes(&client, &mut sink, options).await
        }
        _ => bail!("exactly one of --store or --out is required"),
    };

    report(&summary);
    Ok(())
}

fn report(summary: &FetchSummary) {
    match &summary.interrupted {
        None => output::success(&format!("Fetched {} changes", summary.fetched)),
        Some(err) => {
            output::warn(&format!("Fetch interrupted: {err}"));
            output::field("Changes saved before the failure", &summary.fetched.to_string());
        }
    }
}
