//! JSON snapshot sink.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::{debug, instrument};

use gretch_core::Result;
use gretch_core::error::{Error, StoreError};
use gretch_core::record::ChangeRecord;
use gretch_core::traits::ChangeSink;

fn map_io(err: std::io::Error) -> Error {
    Error::Store(StoreError::Io(err))
}

/// Accumulates fetched changes in memory and writes them as one JSON
/// array when flushed.
///
/// The write happens on [`flush`](ChangeSink::flush), which the fetch
/// loop calls on both complete and interrupted runs, so an aborted fetch
/// still leaves a valid snapshot of everything retrieved before the
/// failure. The write holds an exclusive lock on a sibling `.lock` file
/// so concurrent runs against the same path cannot interleave.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    records: Vec<ChangeRecord>,
}

impl JsonFileSink {
    /// Create a sink that will write its snapshot to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// The snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records accumulated so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn write_snapshot(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(map_io)?;
            }
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io)?;
        lock_file.lock_exclusive().map_err(map_io)?;

        let content = serde_json::to_string_pretty(&self.records).map_err(|e| {
            Error::Store(StoreError::Corrupt {
                reason: e.to_string(),
            })
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(map_io)?;
        file.write_all(content.as_bytes()).map_err(map_io)?;
        file.sync_data().map_err(map_io)?;

        lock_file.unlock().map_err(map_io)?;

        debug!(records = self.records.len(), "snapshot written");
        Ok(())
    }
}

#[async_trait]
impl ChangeSink for JsonFileSink {
    async fn persist(&mut self, batch: &[ChangeRecord]) -> Result<()> {
        self.records.extend_from_slice(batch);
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.write_snapshot()
    }
}

/// Read a snapshot written by [`JsonFileSink`].
pub fn load_changes(path: impl AsRef<Path>) -> Result<Vec<ChangeRecord>> {
    let content = fs::read_to_string(path.as_ref()).map_err(map_io)?;
    let records: Vec<ChangeRecord> = serde_json::from_str(&content).map_err(|e| {
        Error::Store(StoreError::Corrupt {
            reason: e.to_string(),
        })
    })?;
    Ok(records)
}
