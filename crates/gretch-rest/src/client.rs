//! HTTP client for the Gerrit REST API.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use gretch_core::error::{DecodeError, Error, TransportError};
use gretch_core::traits::Transport;
use gretch_core::{Credentials, GerritUrl, Result};

/// Length of the anti-XSSI prefix every response body starts with.
const XSSI_PREFIX_LEN: usize = 4;

/// HTTP transport for a Gerrit server.
///
/// Requests go to `{base}/{path...}/`, or `{base}/a/{path...}/` with
/// HTTP Basic auth when credentials are configured. The `/a/` namespace
/// is what switches the server into authenticated mode.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base: GerritUrl,
    credentials: Option<Credentials>,
}

impl RestClient {
    /// Create an anonymous client for the given server.
    pub fn new(base: GerritUrl) -> Self {
        Self::build(base, None)
    }

    /// Create a client for the authenticated `/a/` namespace.
    pub fn with_credentials(base: GerritUrl, credentials: Credentials) -> Self {
        Self::build(base, Some(credentials))
    }

    fn build(base: GerritUrl, credentials: Option<Credentials>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gretch/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base,
            credentials,
        }
    }

    /// Returns the base URL this client is configured for.
    pub fn base(&self) -> &GerritUrl {
        &self.base
    }

    fn request_url(&self, path: &[&str], query: &[String]) -> String {
        let mut url = self.base.endpoint_url(path, self.credentials.is_some());
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }
}

#[async_trait]
impl Transport for RestClient {
    #[instrument(skip(self, query), fields(base = %self.base))]
    async fn request(&self, path: &[&str], query: &[String]) -> Result<Value> {
        let url = self.request_url(path, query);
        debug!(%url, "gerrit request");

        let mut request = self.client.get(&url);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(credentials.username(), Some(credentials.password()));
        }

        let response = request.send().await.map_err(map_reqwest)?;
        let status = response.status();
        trace!(status = %status, "gerrit response");

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: message.trim().to_string(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(map_reqwest)?;
        decode_body(&body)
    }
}

/// Strip the fixed anti-XSSI prefix and decode the remainder as JSON.
///
/// Every Gerrit response body starts with the 4-byte `)]}'` guard; a body
/// shorter than that cannot be a valid response.
pub fn decode_body(body: &[u8]) -> Result<Value> {
    if body.len() < XSSI_PREFIX_LEN {
        return Err(DecodeError::Truncated { len: body.len() }.into());
    }
    let value = serde_json::from_slice(&body[XSSI_PREFIX_LEN..]).map_err(DecodeError::Json)?;
    Ok(value)
}

fn map_reqwest(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Other {
            message: err.to_string(),
        }
    };
    transport.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(authed: bool) -> RestClient {
        let base = GerritUrl::new("https://review.example.org").unwrap();
        if authed {
            RestClient::with_credentials(base, Credentials::new("alice", "secret"))
        } else {
            RestClient::new(base)
        }
    }

    #[test]
    fn strips_anti_xssi_prefix() {
        let value = decode_body(b")]}'\n[1,2,3]").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn short_body_is_truncated_error() {
        let err = decode_body(b")]").unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::Truncated { len: 2 })
        ));
    }

    #[test]
    fn empty_body_is_truncated_error() {
        assert!(matches!(
            decode_body(b"").unwrap_err(),
            Error::Decode(DecodeError::Truncated { len: 0 })
        ));
    }

    #[test]
    fn garbage_after_prefix_is_json_error() {
        let err = decode_body(b")]}'not json").unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::Json(_))));
    }

    #[test]
    fn request_url_without_credentials() {
        let url = client(false).request_url(
            &["changes"],
            &["q=status:merged".to_string(), "n=500".to_string()],
        );
        assert_eq!(
            url,
            "https://review.example.org/changes/?q=status:merged&n=500"
        );
    }

    #[test]
    fn request_url_with_credentials_uses_auth_namespace() {
        let url = client(true).request_url(&["changes"], &["n=2".to_string()]);
        assert_eq!(url, "https://review.example.org/a/changes/?n=2");
    }

    #[test]
    fn request_url_without_query_has_no_question_mark() {
        let url = client(false).request_url(&["changes", "x~y~I1", "reviewers"], &[]);
        assert_eq!(url, "https://review.example.org/changes/x~y~I1/reviewers/");
    }
}
