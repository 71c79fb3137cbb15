//! gretch-core - Record model, pagination engine, and fetch orchestration
//! for Gerrit's change-listing REST API.

pub mod anonymize;
pub mod batch;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod paginate;
pub mod query;
pub mod record;
pub mod traits;
pub mod types;

pub use batch::{Batch, Batcher};
pub use credentials::Credentials;
pub use error::Error;
pub use fetch::{
    FetchOptions, FetchSummary, RefetchPolicy, ReviewerSummary, fetch_changes, fetch_reviewers,
};
pub use paginate::Paginator;
pub use query::{ChangeQuery, DetailSection};
pub use record::{Account, ChangeRecord, FileDiff, Message, Revision};
pub use traits::{ChangeSink, ChangeStore, Transport};
pub use types::{ChangeId, GerritUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
pub(crate) mod test_support;
