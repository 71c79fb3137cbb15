//! Validated domain types.

mod change_id;
mod gerrit_url;

pub use change_id::ChangeId;
pub use gerrit_url::GerritUrl;
