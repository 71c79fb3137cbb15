//! Schema-tolerant change record wrapper.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{DecodeError, Error, InvalidInputError, MissingFieldError};
use crate::types::ChangeId;

use super::views::{Account, Message, Revision};

/// A single change as returned by the listing endpoint.
///
/// The only construction-time guarantee is that the value is a JSON
/// object; everything else is looked up on demand. [`require`] fails with
/// [`MissingFieldError`] when a key is absent, [`str_or`] substitutes a
/// default instead. Unknown fields pass through untouched and survive
/// serialization.
///
/// The wrapper is a read-only view. The underlying object is immutable
/// after construction, so the lazy derivations ([`revisions`],
/// [`messages`]) yield equivalent values on every pass.
///
/// [`require`]: ChangeRecord::require
/// [`str_or`]: ChangeRecord::str_or
/// [`revisions`]: ChangeRecord::revisions
/// [`messages`]: ChangeRecord::messages
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord(Value);

impl ChangeRecord {
    /// Wrap a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn new(value: Value) -> Result<Self, Error> {
        if !value.is_object() {
            return Err(InvalidInputError::Other {
                message: "change record must be a JSON object".to_string(),
            }
            .into());
        }
        Ok(Self(value))
    }

    /// Look up a field, `None` when absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Look up a required field.
    pub fn require(&self, field: &str) -> Result<&Value, Error> {
        self.0
            .get(field)
            .ok_or_else(|| MissingFieldError::new(field).into())
    }

    /// Look up a required string field.
    pub fn require_str(&self, field: &str) -> Result<&str, Error> {
        self.require(field)?.as_str().ok_or_else(|| {
            DecodeError::UnexpectedShape {
                reason: format!("field '{field}' is not a string"),
            }
            .into()
        })
    }

    /// Look up an optional string field, substituting `default` when the
    /// field is absent or not a string.
    pub fn str_or<'a>(&'a self, field: &str, default: &'a str) -> &'a str {
        self.0.get(field).and_then(Value::as_str).unwrap_or(default)
    }

    /// The stable identifier used to key persisted changes.
    pub fn change_id(&self) -> Result<ChangeId, Error> {
        ChangeId::new(self.require_str("change_id")?)
    }

    /// The change owner, when the server included one.
    pub fn owner(&self) -> Option<Account<'_>> {
        self.0
            .get("owner")
            .filter(|v| v.is_object())
            .map(Account::from_value)
    }

    /// Lazily derive revision views from the nested `revisions` map.
    ///
    /// Iteration order follows the underlying map. A change without a
    /// `revisions` map yields nothing.
    pub fn revisions(&self) -> impl Iterator<Item = Revision<'_>> {
        self.0
            .get("revisions")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|revs| revs.iter().map(|(id, data)| Revision::new(id, data)))
    }

    /// The revision named by `current_revision`, when both it and the
    /// revisions map are present.
    pub fn current_revision(&self) -> Option<Revision<'_>> {
        let id = self.0.get("current_revision")?.as_str()?;
        let data = self.0.get("revisions")?.get(id)?;
        Some(Revision::new(id, data))
    }

    /// Review messages in arrival order. Entries that are not objects are
    /// skipped.
    pub fn messages(&self) -> impl Iterator<Item = Message<'_>> {
        self.0
            .get("messages")
            .and_then(Value::as_array)
            .into_iter()
            .flat_map(|msgs| msgs.iter().filter(|v| v.is_object()).map(Message::from_value))
    }

    /// Get a reference to the inner JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume and return the inner JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Serialize for ChangeRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChangeRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ChangeRecord::new(value).map_err(serde::de::Error::custom)
    }
}
