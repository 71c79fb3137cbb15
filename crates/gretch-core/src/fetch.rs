//! Fetch orchestration.
//!
//! Coordinates the paginator, the batcher, and a persistence collaborator
//! with partial-failure tolerance: a mid-stream failure degrades to "keep
//! everything fetched so far" instead of losing the run.

use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::batch::Batcher;
use crate::error::{Error, PartialFetchError};
use crate::paginate::Paginator;
use crate::query::ChangeQuery;
use crate::traits::{ChangeSink, ChangeStore, Transport};
use crate::types::ChangeId;

/// Default number of records per persisted batch.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Parameters for one fetch session.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Listing query: status filter, detail sections, page size.
    pub query: ChangeQuery,

    /// Records per persisted batch.
    pub batch_size: usize,

    /// Continuation key for the first request. Independent of the
    /// in-session cursor, which is never persisted.
    pub start_at: Option<String>,

    /// Stop after this many records, truncating the final page.
    pub max_records: Option<usize>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            query: ChangeQuery::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            start_at: None,
            max_records: None,
        }
    }
}

/// Outcome of one fetch session.
///
/// `fetched` counts the records handed to the sink. When `interrupted` is
/// set the session stopped early, but everything counted by `fetched` was
/// still persisted.
#[derive(Debug)]
pub struct FetchSummary {
    /// Records persisted during the session.
    pub fetched: usize,

    /// The failure that ended the session, if any.
    pub interrupted: Option<PartialFetchError>,
}

impl FetchSummary {
    /// True when the session ran to normal termination.
    pub fn is_complete(&self) -> bool {
        self.interrupted.is_none()
    }
}

/// Fetch changes and persist them batch by batch.
///
/// The loop terminates on the first empty batch (the listing is
/// exhausted or the cap was reached; the batcher itself never ends). A
/// failure while pulling or persisting aborts the loop, but the sink is
/// still flushed so previously accumulated records are committed, and the
/// failure is reported inside the summary rather than raised.
#[instrument(skip(transport, sink, options), fields(batch_size = options.batch_size))]
pub async fn fetch_changes<T, S>(transport: T, sink: &mut S, options: FetchOptions) -> FetchSummary
where
    T: Transport,
    S: ChangeSink + ?Sized,
{
    let paginator = Paginator::new(
        transport,
        &options.query,
        options.start_at.clone(),
        options.max_records,
    );
    let mut batcher = Batcher::new(paginator.into_stream(), options.batch_size);

    let mut fetched = 0usize;
    let mut failure: Option<Error> = None;

    loop {
        match batcher.next_batch().await {
            Ok(batch) if batch.is_empty() => break,
            Ok(batch) => {
                let len = batch.len();
                if let Err(err) = sink.persist(&batch).await {
                    failure = Some(err);
                    break;
                }
                fetched += len;
                debug!(fetched, "persisted batch of {len}");
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    if let Err(err) = sink.flush().await {
        failure.get_or_insert(err);
    }

    match failure {
        None => {
            info!(fetched, "fetch complete");
            FetchSummary {
                fetched,
                interrupted: None,
            }
        }
        Some(err) => {
            warn!(fetched, error = %err, "fetch interrupted, partial results saved");
            FetchSummary {
                fetched,
                interrupted: Some(PartialFetchError {
                    fetched,
                    source: Box::new(err),
                }),
            }
        }
    }
}

/// Whether a reviewer sweep overwrites reviewer lists already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefetchPolicy {
    /// Leave stored reviewer lists alone.
    #[default]
    SkipIfPresent,

    /// Fetch and overwrite unconditionally.
    AlwaysRefetch,
}

/// Outcome of a reviewer sweep.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReviewerSummary {
    /// Reviewer lists fetched and stored.
    pub fetched: usize,

    /// Changes skipped because a reviewer list was already present.
    pub skipped: usize,

    /// Changes whose reviewer fetch failed.
    pub failed: usize,
}

/// Fetch the reviewer list for every stored change.
///
/// Each change is independent: a failure is logged with the offending
/// change id and the sweep continues. Only listing the store itself can
/// fail the call.
#[instrument(skip(transport, store))]
pub async fn fetch_reviewers<T, S>(
    transport: T,
    store: &S,
    policy: RefetchPolicy,
) -> Result<ReviewerSummary>
where
    T: Transport,
    S: ChangeStore + ?Sized,
{
    let changes = store.all_changes().await?;
    let mut summary = ReviewerSummary::default();

    for record in changes {
        let id = match record.change_id() {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "stored change has no usable change_id");
                summary.failed += 1;
                continue;
            }
        };

        match fetch_one_reviewer_list(&transport, store, &id, policy).await {
            Ok(true) => summary.fetched += 1,
            Ok(false) => {
                debug!(change = %id, "reviewers already present");
                summary.skipped += 1;
            }
            Err(err) => {
                warn!(change = %id, error = %err, "reviewer fetch failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        fetched = summary.fetched,
        skipped = summary.skipped,
        failed = summary.failed,
        "reviewer sweep finished"
    );
    Ok(summary)
}

async fn fetch_one_reviewer_list<T, S>(
    transport: &T,
    store: &S,
    id: &ChangeId,
    policy: RefetchPolicy,
) -> Result<bool>
where
    T: Transport,
    S: ChangeStore + ?Sized,
{
    if policy == RefetchPolicy::SkipIfPresent && store.reviewers(id).await?.is_some() {
        return Ok(false);
    }

    let reviewers = transport
        .request(&["changes", id.as_str(), "reviewers"], &[])
        .await?;
    store.upsert_reviewers(id, &reviewers).await?;
    Ok(true)
}
