//! Fixed-size batching over a record stream.

use std::pin::Pin;

use futures_core::Stream;
use futures_util::StreamExt;
use futures_util::stream::Fuse;

use crate::Result;
use crate::error::Error;
use crate::record::ChangeRecord;

/// A finite, ordered group of records persisted as a unit.
pub type Batch = Vec<ChangeRecord>;

/// Slices a record stream into fixed-size batches.
///
/// Every batch except possibly the last holds exactly `batch_size`
/// records. The batcher never signals its own end: once the underlying
/// stream is exhausted it keeps returning empty batches forever, and the
/// caller MUST treat an empty batch as the termination signal. A caller
/// that skips the emptiness check will loop forever.
///
/// When the stream fails mid-batch, the records gathered so far are
/// returned first and the error is held back for the next call, so no
/// fetched record is lost to a trailing failure.
pub struct Batcher<S> {
    stream: Fuse<Pin<Box<S>>>,
    batch_size: usize,
    pending: Option<Error>,
}

impl<S> Batcher<S>
where
    S: Stream<Item = Result<ChangeRecord>>,
{
    /// Wrap `stream`, slicing it into groups of `batch_size`.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    pub fn new(stream: S, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch_size must be positive");
        Self {
            stream: Box::pin(stream).fuse(),
            batch_size,
            pending: None,
        }
    }

    /// Pull the next batch.
    ///
    /// Performs no I/O of its own; the only error it returns is a
    /// propagated upstream failure.
    pub async fn next_batch(&mut self) -> Result<Batch> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }

        let mut batch = Batch::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.stream.next().await {
                Some(Ok(record)) => batch.push(record),
                Some(Err(err)) => {
                    if batch.is_empty() {
                        return Err(err);
                    }
                    self.pending = Some(err);
                    break;
                }
                None => break,
            }
        }

        Ok(batch)
    }
}
