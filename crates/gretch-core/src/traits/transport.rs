//! Transport trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// A connection to the Gerrit REST API.
///
/// `path` is joined into the endpoint path; `query` is an ordered list of
/// opaque `key=value` strings appended verbatim. Implementations return
/// the decoded JSON body, failing with
/// [`TransportError`](crate::error::TransportError) on network or
/// protocol failure and [`DecodeError`](crate::error::DecodeError) when
/// the body cannot be decoded. Request timeouts are the implementation's
/// concern and surface as transport errors like any other failure.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one GET request and decode the response body.
    async fn request(&self, path: &[&str], query: &[String]) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn request(&self, path: &[&str], query: &[String]) -> Result<Value> {
        (**self).request(path, query).await
    }
}
