//! Cursor walk of the change-listing endpoint.

use async_stream::stream;
use futures_core::Stream;
use serde_json::Value;
use tracing::{debug, trace};

use crate::Result;
use crate::error::DecodeError;
use crate::query::ChangeQuery;
use crate::record::ChangeRecord;
use crate::traits::Transport;

/// Continuation flag carried by the last element of a non-final page.
const MORE_CHANGES: &str = "_more_changes";

/// Continuation token carried alongside [`MORE_CHANGES`].
const SORTKEY: &str = "_sortkey";

/// Walks the paginated `/changes/` listing and yields one continuous
/// sequence of records.
///
/// Each page fetch is a network side effect, so the sequence is
/// single-pass and non-restartable. Records come out in server order;
/// records yielded before a failure remain valid and are not retracted.
pub struct Paginator<T> {
    transport: T,
    params: Vec<String>,
    cursor: Option<String>,
    remaining: Option<usize>,
}

impl<T: Transport> Paginator<T> {
    /// Set up a walk of `query` against `transport`.
    ///
    /// `start_at` seeds the first request's continuation parameter. It is
    /// independent of the in-session cursor, which is created fresh here
    /// and discarded with the paginator. `max_records` truncates the
    /// final page and stops further requests once reached.
    pub fn new(
        transport: T,
        query: &ChangeQuery,
        start_at: Option<String>,
        max_records: Option<usize>,
    ) -> Self {
        Self {
            transport,
            params: query.params(),
            cursor: start_at,
            remaining: max_records,
        }
    }

    async fn fetch_page(&mut self) -> Result<Page> {
        let mut params = self.params.clone();
        if let Some(cursor) = &self.cursor {
            params.push(format!("N={cursor}"));
        }

        let body = self.transport.request(&["changes"], &params).await?;
        let page = Page::parse(body)?;
        self.cursor = page.next_cursor.clone();
        Ok(page)
    }

    /// The lazy record stream. Consuming it drives the page requests.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<ChangeRecord>> {
        stream! {
            if self.remaining == Some(0) {
                return;
            }

            loop {
                let page = match self.fetch_page().await {
                    Ok(page) => page,
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                };

                if page.records.is_empty() {
                    debug!("empty page, listing exhausted");
                    return;
                }

                let more = page.next_cursor.is_some();
                for record in page.records {
                    yield Ok(record);
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                        if *remaining == 0 {
                            debug!("record cap reached");
                            return;
                        }
                    }
                }

                if !more {
                    return;
                }
            }
        }
    }
}

/// One decoded page of the listing.
struct Page {
    records: Vec<ChangeRecord>,
    next_cursor: Option<String>,
}

impl Page {
    fn parse(body: Value) -> Result<Self> {
        let Value::Array(items) = body else {
            return Err(DecodeError::UnexpectedShape {
                reason: "change listing is not a JSON array".to_string(),
            }
            .into());
        };

        // The continuation markers are only meaningful on the last
        // element of the page.
        let next_cursor = match items.last() {
            Some(last)
                if last
                    .get(MORE_CHANGES)
                    .and_then(Value::as_bool)
                    .unwrap_or(false) =>
            {
                let key = last.get(SORTKEY).and_then(Value::as_str).ok_or_else(|| {
                    DecodeError::UnexpectedShape {
                        reason: format!("last record sets {MORE_CHANGES} but carries no {SORTKEY}"),
                    }
                })?;
                Some(key.to_string())
            }
            _ => None,
        };

        let records = items
            .into_iter()
            .map(ChangeRecord::new)
            .collect::<Result<Vec<_>>>()?;

        trace!(
            records = records.len(),
            more = next_cursor.is_some(),
            "decoded page"
        );

        Ok(Self {
            records,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::error::TransportError;
    use crate::test_support::{FakeTransport, change, with_more};
    use futures_util::StreamExt;
    use serde_json::json;

    fn query() -> ChangeQuery {
        ChangeQuery::new().status("merged").page_size(2)
    }

    async fn collect<T: Transport>(paginator: Paginator<T>) -> Vec<Result<ChangeRecord>> {
        paginator.into_stream().collect().await
    }

    fn ok_ids(items: &[Result<ChangeRecord>]) -> Vec<String> {
        items
            .iter()
            .map(|r| {
                r.as_ref()
                    .expect("expected record")
                    .change_id()
                    .unwrap()
                    .as_str()
                    .to_string()
            })
            .collect()
    }

    #[tokio::test]
    async fn yields_all_pages_in_server_order() {
        let transport = FakeTransport::new(vec![
            Ok(json!([change("c1"), with_more(change("c2"), "k1")])),
            Ok(json!([change("c3"), with_more(change("c4"), "k2")])),
            Ok(json!([change("c5")])),
        ]);

        let items = collect(Paginator::new(&transport, &query(), None, None)).await;

        assert_eq!(ok_ids(&items), ["c1", "c2", "c3", "c4", "c5"]);
        assert_eq!(transport.call_count(), 3);

        let calls = transport.calls();
        assert!(!calls[0].iter().any(|p| p.starts_with("N=")));
        assert!(calls[1].contains(&"N=k1".to_string()));
        assert!(calls[2].contains(&"N=k2".to_string()));
    }

    #[tokio::test]
    async fn cap_truncates_final_page_and_stops_requesting() {
        let transport = FakeTransport::new(vec![
            Ok(json!([change("c1"), with_more(change("c2"), "k1")])),
            Ok(json!([change("c3"), with_more(change("c4"), "k2")])),
        ]);

        let items = collect(Paginator::new(&transport, &query(), None, Some(3))).await;

        assert_eq!(ok_ids(&items), ["c1", "c2", "c3"]);
        // Page 2 satisfied the cap mid-page; no third request.
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn cap_at_page_boundary_issues_no_follow_up() {
        let transport =
            FakeTransport::new(vec![Ok(json!([change("c1"), with_more(change("c2"), "k1")]))]);

        let items = collect(Paginator::new(&transport, &query(), None, Some(2))).await;

        assert_eq!(ok_ids(&items), ["c1", "c2"]);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn cap_of_zero_issues_no_requests() {
        let transport = FakeTransport::new(vec![]);

        let items = collect(Paginator::new(&transport, &query(), None, Some(0))).await;

        assert!(items.is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_first_page_terminates_with_zero_records() {
        let transport = FakeTransport::new(vec![Ok(json!([]))]);

        let items = collect(Paginator::new(&transport, &query(), None, None)).await;

        assert!(items.is_empty());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn start_at_seeds_the_first_request() {
        let transport = FakeTransport::new(vec![Ok(json!([change("c1")]))]);

        let _ = collect(Paginator::new(
            &transport,
            &query(),
            Some("resume-key".to_string()),
            None,
        ))
        .await;

        assert!(transport.calls()[0].contains(&"N=resume-key".to_string()));
    }

    #[tokio::test]
    async fn failure_surfaces_after_already_yielded_records() {
        let transport = FakeTransport::new(vec![
            Ok(json!([change("c1"), with_more(change("c2"), "k1")])),
            Err(Error::Transport(TransportError::Timeout)),
        ]);

        let items = collect(Paginator::new(&transport, &query(), None, None)).await;

        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[1].is_ok());
        assert!(matches!(
            items[2].as_ref().unwrap_err(),
            Error::Transport(TransportError::Timeout)
        ));
    }

    #[tokio::test]
    async fn more_changes_without_sortkey_is_a_decode_error() {
        let transport =
            FakeTransport::new(vec![Ok(json!([{"change_id": "c1", "_more_changes": true}]))]);

        let items = collect(Paginator::new(&transport, &query(), None, None)).await;

        assert_eq!(items.len(), 1);
        assert!(matches!(
            items[0].as_ref().unwrap_err(),
            Error::Decode(DecodeError::UnexpectedShape { .. })
        ));
    }

    #[tokio::test]
    async fn non_array_listing_is_a_decode_error() {
        let transport = FakeTransport::new(vec![Ok(json!({"unexpected": "object"}))]);

        let items = collect(Paginator::new(&transport, &query(), None, None)).await;

        assert_eq!(items.len(), 1);
        assert!(matches!(
            items[0].as_ref().unwrap_err(),
            Error::Decode(DecodeError::UnexpectedShape { .. })
        ));
    }

    #[tokio::test]
    async fn more_changes_false_on_last_record_terminates() {
        let transport = FakeTransport::new(vec![Ok(
            json!([{"change_id": "c1", "_more_changes": false, "_sortkey": "k"}]),
        )]);

        let items = collect(Paginator::new(&transport, &query(), None, None)).await;

        assert_eq!(ok_ids(&items), ["c1"]);
        assert_eq!(transport.call_count(), 1);
    }
}
