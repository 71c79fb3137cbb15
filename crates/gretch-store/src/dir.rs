//! Keyed on-disk change store.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use gretch_core::Result;
use gretch_core::error::{Error, StoreError};
use gretch_core::record::ChangeRecord;
use gretch_core::traits::{ChangeSink, ChangeStore};
use gretch_core::types::ChangeId;

fn map_io(err: std::io::Error) -> Error {
    Error::Store(StoreError::Io(err))
}

fn map_corrupt(err: serde_json::Error) -> Error {
    Error::Store(StoreError::Corrupt {
        reason: err.to_string(),
    })
}

/// A stored reviewer list with its fetch timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerDoc {
    /// The change the list belongs to.
    pub change_id: String,
    /// When the list was fetched (RFC 3339).
    pub fetched_at: String,
    /// The reviewer list as the server returned it.
    pub reviewers: Value,
}

/// Filesystem-backed keyed store: one JSON file per change under
/// `changes/`, one reviewer document per change under `reviewers/`.
///
/// Files are keyed by a filesystem-safe rendering of the change id, and
/// upserts overwrite whole files, so refetching an overlapping range is
/// idempotent.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Create a store rooted at the given directory. Directories are
    /// created lazily on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn changes_dir(&self) -> PathBuf {
        self.root.join("changes")
    }

    fn reviewers_dir(&self) -> PathBuf {
        self.root.join("reviewers")
    }

    /// Change ids may contain path separators (project names) and
    /// characters Windows rejects in path segments.
    fn file_key(id: &ChangeId) -> String {
        id.as_str()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                c => c,
            })
            .collect()
    }

    fn change_path(&self, id: &ChangeId) -> PathBuf {
        self.changes_dir().join(format!("{}.json", Self::file_key(id)))
    }

    fn reviewer_path(&self, id: &ChangeId) -> PathBuf {
        self.reviewers_dir()
            .join(format!("{}.json", Self::file_key(id)))
    }

    fn write_json(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }
        fs::write(path, content).map_err(map_io)
    }
}

#[async_trait]
impl ChangeStore for DirStore {
    #[instrument(skip(self, record))]
    async fn upsert_change(&self, record: &ChangeRecord) -> Result<()> {
        let id = record.change_id()?;
        let content = serde_json::to_string_pretty(record).map_err(map_corrupt)?;
        Self::write_json(&self.change_path(&id), &content)?;
        debug!(change = %id, "change upserted");
        Ok(())
    }

    async fn change(&self, id: &ChangeId) -> Result<Option<ChangeRecord>> {
        let path = self.change_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(map_io)?;
        let record = serde_json::from_str(&content).map_err(map_corrupt)?;
        Ok(Some(record))
    }

    async fn all_changes(&self) -> Result<Vec<ChangeRecord>> {
        let dir = self.changes_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(map_io)?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(map_io)?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path).map_err(map_io)?;
            records.push(serde_json::from_str(&content).map_err(map_corrupt)?);
        }
        Ok(records)
    }

    #[instrument(skip(self, reviewers))]
    async fn upsert_reviewers(&self, id: &ChangeId, reviewers: &Value) -> Result<()> {
        let doc = ReviewerDoc {
            change_id: id.as_str().to_string(),
            fetched_at: Utc::now().to_rfc3339(),
            reviewers: reviewers.clone(),
        };
        let content = serde_json::to_string_pretty(&doc).map_err(map_corrupt)?;
        Self::write_json(&self.reviewer_path(id), &content)?;
        debug!(change = %id, "reviewers upserted");
        Ok(())
    }

    async fn reviewers(&self, id: &ChangeId) -> Result<Option<Value>> {
        let path = self.reviewer_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(map_io)?;
        let doc: ReviewerDoc = serde_json::from_str(&content).map_err(map_corrupt)?;
        Ok(Some(doc.reviewers))
    }
}

#[async_trait]
impl ChangeSink for DirStore {
    /// Upsert-per-record batch persistence. Every record is durable as
    /// soon as its batch lands, so `flush` has nothing left to do.
    async fn persist(&mut self, batch: &[ChangeRecord]) -> Result<()> {
        for record in batch {
            ChangeStore::upsert_change(self, record).await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
