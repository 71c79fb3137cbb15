//! Change record model.
//!
//! Wraps the loosely-typed JSON the listing endpoint returns and exposes
//! typed, navigable views (change → revisions → files, change → messages
//! → authors) without requiring a schema up front. Unknown fields are
//! preserved verbatim; expected-but-absent fields fail at lookup time,
//! not at parse time.

mod raw;
mod views;

pub use raw::ChangeRecord;
pub use views::{Account, FileDiff, Message, Revision, UNKNOWN};
