//! Borrowed views over the nested change structure.

use serde_json::Value;

use crate::error::{DecodeError, Error, MissingFieldError};

/// Sentinel substituted for absent account names and emails.
///
/// Downstream consumers group by name and email without null-checking, so
/// absence maps to this value rather than an option.
pub const UNKNOWN: &str = "UNKNOWN";

/// One patch set of a change.
#[derive(Debug, Clone, Copy)]
pub struct Revision<'a> {
    id: &'a str,
    data: &'a Value,
}

impl<'a> Revision<'a> {
    pub(crate) fn new(id: &'a str, data: &'a Value) -> Self {
        Self { id, data }
    }

    /// The revision key, unique within its change.
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// Per-file diff stats. A revision without a `files` map yields
    /// nothing.
    pub fn files(&self) -> impl Iterator<Item = FileDiff<'a>> + 'a {
        self.data
            .get("files")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|files| files.iter().map(|(path, data)| FileDiff { path, data }))
    }

    /// Total churn of this patch set: inserted plus deleted lines summed
    /// over every file. A revision with no files has size 0.
    pub fn size(&self) -> u64 {
        self.files()
            .map(|f| f.lines_inserted() + f.lines_deleted())
            .sum()
    }

    /// Look up a raw field on the revision, `None` when absent.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.data.get(field)
    }
}

/// Diff stats for a single file within a revision.
#[derive(Debug, Clone, Copy)]
pub struct FileDiff<'a> {
    path: &'a str,
    data: &'a Value,
}

impl<'a> FileDiff<'a> {
    /// The file path, as the server rendered it.
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Lines inserted; 0 when the counter is absent.
    pub fn lines_inserted(&self) -> u64 {
        self.data
            .get("lines_inserted")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    /// Lines deleted; 0 when the counter is absent.
    pub fn lines_deleted(&self) -> u64 {
        self.data
            .get("lines_deleted")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }
}

/// One review message, in arrival order.
#[derive(Debug, Clone, Copy)]
pub struct Message<'a> {
    data: &'a Value,
}

impl<'a> Message<'a> {
    pub(crate) fn from_value(data: &'a Value) -> Self {
        Self { data }
    }

    /// The author, when the server included one. Service messages carry
    /// no author; that is normal, not an error.
    pub fn author(&self) -> Option<Account<'a>> {
        self.data
            .get("author")
            .filter(|v| v.is_object())
            .map(Account::from_value)
    }

    /// The free-text content; empty when absent.
    pub fn text(&self) -> &'a str {
        self.data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Server timestamp string, when present.
    pub fn date(&self) -> Option<&'a str> {
        self.data.get("date").and_then(Value::as_str)
    }

    /// Look up a raw field on the message, `None` when absent.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.data.get(field)
    }
}

/// An account reference (owner, message author, reviewer).
#[derive(Debug, Clone, Copy)]
pub struct Account<'a> {
    data: &'a Value,
}

impl<'a> Account<'a> {
    pub(crate) fn from_value(data: &'a Value) -> Self {
        Self { data }
    }

    /// The internal numeric account id. Required: accounts are keyed by
    /// it, so absence is an error rather than a default.
    pub fn account_id(&self) -> Result<i64, Error> {
        let value = self
            .data
            .get("_account_id")
            .ok_or_else(|| Error::from(MissingFieldError::new("_account_id")))?;
        value.as_i64().ok_or_else(|| {
            DecodeError::UnexpectedShape {
                reason: "_account_id is not an integer".to_string(),
            }
            .into()
        })
    }

    /// Display name, [`UNKNOWN`] when absent.
    pub fn name(&self) -> &'a str {
        self.data
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN)
    }

    /// Email address, [`UNKNOWN`] when absent.
    pub fn email(&self) -> &'a str {
        self.data
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN)
    }

    /// Login name, when present.
    pub fn username(&self) -> Option<&'a str> {
        self.data.get("username").and_then(Value::as_str)
    }
}
