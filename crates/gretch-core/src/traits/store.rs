//! Persistence traits.

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::record::ChangeRecord;
use crate::types::ChangeId;

/// Batch-oriented destination for fetched changes.
///
/// `persist` is called once per completed batch. `flush` is called once
/// when the fetch loop ends, on both complete and interrupted runs, so
/// a sink that defers writing still commits whatever was accumulated
/// before a failure.
#[async_trait]
pub trait ChangeSink: Send {
    /// Persist one batch of records, in order.
    async fn persist(&mut self, batch: &[ChangeRecord]) -> Result<()>;

    /// Commit any deferred state.
    async fn flush(&mut self) -> Result<()>;
}

/// Keyed change storage with insert-or-update semantics.
///
/// Records are keyed by their stable `change_id`; upserting an existing
/// key overwrites rather than duplicates, which makes repeated fetches
/// over overlapping ranges idempotent.
#[async_trait]
pub trait ChangeStore: Send + Sync {
    /// Insert or overwrite a change, keyed by its `change_id`.
    async fn upsert_change(&self, record: &ChangeRecord) -> Result<()>;

    /// Zero-or-one lookup by change id.
    async fn change(&self, id: &ChangeId) -> Result<Option<ChangeRecord>>;

    /// Every stored change, in stable order.
    async fn all_changes(&self) -> Result<Vec<ChangeRecord>>;

    /// Insert or overwrite the reviewer list for a change.
    async fn upsert_reviewers(&self, id: &ChangeId, reviewers: &Value) -> Result<()>;

    /// Zero-or-one reviewer-list lookup by change id.
    async fn reviewers(&self, id: &ChangeId) -> Result<Option<Value>>;
}
