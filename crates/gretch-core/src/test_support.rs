//! Shared helpers for the crate's unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::Result;
use crate::record::ChangeRecord;
use crate::traits::Transport;

/// Transport that serves canned page responses in order and records every
/// request's query parameters.
pub struct FakeTransport {
    pages: Mutex<std::vec::IntoIter<Result<Value>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeTransport {
    pub fn new(pages: Vec<Result<Value>>) -> Self {
        Self {
            pages: Mutex::new(pages.into_iter()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn request(&self, _path: &[&str], query: &[String]) -> Result<Value> {
        self.calls.lock().unwrap().push(query.to_vec());
        self.pages
            .lock()
            .unwrap()
            .next()
            .expect("transport received more requests than it has pages")
    }
}

/// A minimal change object.
pub fn change(id: &str) -> Value {
    json!({ "change_id": id })
}

/// Mark `value` as a non-final page tail: sets `_more_changes` and the
/// continuation key.
pub fn with_more(mut value: Value, sortkey: &str) -> Value {
    let obj = value.as_object_mut().unwrap();
    obj.insert("_more_changes".to_string(), Value::Bool(true));
    obj.insert("_sortkey".to_string(), Value::String(sortkey.to_string()));
    value
}

/// A wrapped record for feeding sinks and batchers directly.
pub fn record(id: &str) -> ChangeRecord {
    ChangeRecord::new(change(id)).unwrap()
}

/// Collect the change ids out of a record slice.
pub fn ids(records: &[ChangeRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.change_id().unwrap().as_str().to_string())
        .collect()
}
