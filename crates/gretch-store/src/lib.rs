//! gretch-store - filesystem persistence for fetched changes.
//!
//! Two destinations implement the core persistence seams:
//! [`JsonFileSink`] accumulates a whole fetch session and writes a single
//! JSON snapshot, [`DirStore`] upserts per-change files keyed by change
//! id.

mod dir;
mod sink;

pub use dir::{DirStore, ReviewerDoc};
pub use sink::{JsonFileSink, load_changes};
