//! Anonymization of fetched change data.
//!
//! Rewrites personal names and email addresses in a JSON tree with
//! numbered placeholders. All replacement state lives in the
//! [`Anonymizer`] value, scoped to one session; equal inputs map to equal
//! placeholders within that session.

use std::collections::HashMap;

use serde_json::Value;

/// Keys whose string values are rewritten.
const NAME_KEY: &str = "name";
const EMAIL_KEY: &str = "email";

/// Session-scoped replacement state for scrubbing change data.
#[derive(Debug, Default)]
pub struct Anonymizer {
    names: HashMap<String, String>,
    emails: HashMap<String, String>,
}

impl Anonymizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `value`, replacing every string under a `name` key with
    /// `UNKNOWN_<n>` and every string under an `email` key with
    /// `UNKNOWN_<n>@UNKNOWN.UNK`. Non-string values and all other keys
    /// pass through untouched.
    pub fn scrub(&mut self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    if let Value::String(s) = child {
                        if key == NAME_KEY {
                            let replacement = self.placeholder_name(s);
                            *s = replacement;
                        } else if key == EMAIL_KEY {
                            let replacement = self.placeholder_email(s);
                            *s = replacement;
                        }
                    } else {
                        self.scrub(child);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.scrub(item);
                }
            }
            _ => {}
        }
    }

    fn placeholder_name(&mut self, original: &str) -> String {
        let next = self.names.len() + 1;
        self.names
            .entry(original.to_string())
            .or_insert_with(|| format!("UNKNOWN_{next}"))
            .clone()
    }

    fn placeholder_email(&mut self, original: &str) -> String {
        let next = self.emails.len() + 1;
        self.emails
            .entry(original.to_string())
            .or_insert_with(|| format!("UNKNOWN_{next}@UNKNOWN.UNK"))
            .clone()
    }
}
