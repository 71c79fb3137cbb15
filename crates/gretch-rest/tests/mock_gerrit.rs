//! Mock Gerrit server tests for the REST transport.
//!
//! wiremock stands in for a Gerrit server so pagination, authentication,
//! and body decoding can be exercised without network access or real
//! credentials.

use async_trait::async_trait;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gretch_core::error::{DecodeError, Error, TransportError};
use gretch_core::traits::{ChangeSink, Transport};
use gretch_core::{
    ChangeQuery, ChangeRecord, Credentials, FetchOptions, GerritUrl, Result, fetch_changes,
};
use gretch_rest::RestClient;

/// Helper to build a Gerrit URL for a mock server.
fn mock_gerrit_url(server: &MockServer) -> GerritUrl {
    GerritUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

/// Render a response body the way Gerrit does: anti-XSSI guard, then
/// JSON.
fn gerrit_body(value: &Value) -> String {
    format!(")]}}'\n{value}")
}

#[derive(Default)]
struct VecSink {
    records: Vec<ChangeRecord>,
    flushed: bool,
}

#[async_trait]
impl ChangeSink for VecSink {
    async fn persist(&mut self, batch: &[ChangeRecord]) -> Result<()> {
        self.records.extend_from_slice(batch);
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.flushed = true;
        Ok(())
    }
}

fn fetch_options() -> FetchOptions {
    FetchOptions {
        query: ChangeQuery::new().status("merged").page_size(2),
        batch_size: 10,
        ..FetchOptions::default()
    }
}

#[tokio::test]
async fn paginates_to_exhaustion() {
    let server = MockServer::start().await;

    let first_page = json!([
        {"change_id": "p~m~I1"},
        {"change_id": "p~m~I2", "_more_changes": true, "_sortkey": "0029"}
    ]);
    let second_page = json!([{"change_id": "p~m~I3"}]);

    Mock::given(method("GET"))
        .and(path("/changes/"))
        .and(query_param("N", "0029"))
        .respond_with(ResponseTemplate::new(200).set_body_string(gerrit_body(&second_page)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/changes/"))
        .and(query_param("q", "status:merged"))
        .and(query_param_is_missing("N"))
        .respond_with(ResponseTemplate::new(200).set_body_string(gerrit_body(&first_page)))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new(mock_gerrit_url(&server));
    let mut sink = VecSink::default();

    let summary = fetch_changes(&client, &mut sink, fetch_options()).await;

    assert!(summary.is_complete());
    assert_eq!(summary.fetched, 3);
    assert!(sink.flushed);
    let ids: Vec<_> = sink
        .records
        .iter()
        .map(|r| r.change_id().unwrap().as_str().to_string())
        .collect();
    assert_eq!(ids, ["p~m~I1", "p~m~I2", "p~m~I3"]);
}

#[tokio::test]
async fn credentials_switch_to_the_auth_namespace() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a/changes/"))
        .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(gerrit_body(&json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::with_credentials(
        mock_gerrit_url(&server),
        Credentials::new("alice", "secret"),
    );

    let value = client.request(&["changes"], &[]).await.unwrap();
    assert_eq!(value, json!([]));
}

#[tokio::test]
async fn http_error_maps_to_transport_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/changes/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = RestClient::new(mock_gerrit_url(&server));
    let err = client.request(&["changes"], &[]).await.unwrap_err();

    match err {
        Error::Transport(TransportError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal error");
        }
        other => panic!("expected HTTP status error, got {other:?}"),
    }
}

#[tokio::test]
async fn partial_failure_keeps_earlier_pages() {
    let server = MockServer::start().await;

    let first_page = json!([
        {"change_id": "p~m~I1"},
        {"change_id": "p~m~I2", "_more_changes": true, "_sortkey": "0029"}
    ]);

    Mock::given(method("GET"))
        .and(path("/changes/"))
        .and(query_param("N", "0029"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/changes/"))
        .and(query_param_is_missing("N"))
        .respond_with(ResponseTemplate::new(200).set_body_string(gerrit_body(&first_page)))
        .mount(&server)
        .await;

    let client = RestClient::new(mock_gerrit_url(&server));
    let mut sink = VecSink::default();

    let summary = fetch_changes(&client, &mut sink, fetch_options()).await;

    assert_eq!(summary.fetched, 2);
    assert_eq!(sink.records.len(), 2);
    assert!(sink.flushed);
    let interrupted = summary.interrupted.expect("expected partial outcome");
    assert!(matches!(
        *interrupted.source,
        Error::Transport(TransportError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn body_shorter_than_the_guard_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/changes/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(")]"))
        .mount(&server)
        .await;

    let client = RestClient::new(mock_gerrit_url(&server));
    let err = client.request(&["changes"], &[]).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Decode(DecodeError::Truncated { len: 2 })
    ));
}
