//! Offset/limit auto-pagination.
//!
//! Redmine listings wrap their items in an envelope of the form
//! `{"<resource>": [...], "total_count": N, "offset": O, "limit": L}` where the
//! list key changes per resource. The list key is found by elimination of the
//! known envelope keys.

use super::{ClientError, PaginationError, Query, Transport};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use serde_json::{Map, Value};
use tracing::debug;

/// Envelope keys that never hold the item list.
pub const ENVELOPE_KEYS: [&str; 3] = ["total_count", "offset", "limit"];

/// One decoded page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Items of this page, in server order.
    pub items: Vec<Value>,
    /// Key the items were found under.
    pub list_key: String,
    /// Total number of items across all pages.
    pub total_count: u64,
    /// Offset of the first item of this page.
    pub offset: u64,
    /// Page size the server applied.
    pub limit: u64,
}

impl Page {
    /// Offset of the following page, or `None` if this page is the last one.
    #[must_use]
    pub fn next_offset(&self) -> Option<u64> {
        self.offset
            .checked_add(self.limit)
            .filter(|next| *next < self.total_count)
    }
}

/// Decodes a listing envelope.
///
/// When `expected_key` is set (every page after the first), the detected list
/// key must match it.
///
/// # Errors
///
/// Returns a [`PaginationError`] describing the first shape violation found.
pub fn parse_envelope(
    url: &str,
    response: Value,
    expected_key: Option<&str>,
) -> Result<Page, PaginationError> {
    let Value::Object(mut envelope) = response else {
        return Err(PaginationError::NotPaginated {
            url: url.to_string(),
        });
    };

    let mut candidates: Vec<String> = envelope
        .keys()
        .filter(|key| !ENVELOPE_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    let list_key = match candidates.len() {
        0 => {
            return Err(PaginationError::MissingListKey {
                url: url.to_string(),
            })
        }
        1 => candidates.remove(0),
        _ => {
            candidates.sort();
            return Err(PaginationError::AmbiguousListKey {
                url: url.to_string(),
                keys: candidates,
            });
        }
    };

    if !envelope.contains_key("offset") {
        return Err(PaginationError::NotPaginated {
            url: url.to_string(),
        });
    }

    if let Some(expected) = expected_key {
        if expected != list_key {
            return Err(PaginationError::ListKeyChanged {
                url: url.to_string(),
                expected: expected.to_string(),
                found: list_key,
            });
        }
    }

    let total_count = integer_field(url, &envelope, "total_count")?;
    let offset = integer_field(url, &envelope, "offset")?;
    let limit = integer_field(url, &envelope, "limit")?;
    if limit == 0 {
        return Err(PaginationError::ZeroLimit {
            url: url.to_string(),
        });
    }
    if offset.checked_add(limit).is_none() {
        return Err(PaginationError::OffsetOverflow {
            url: url.to_string(),
            offset,
            limit,
        });
    }

    let items = match envelope.remove(&list_key) {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(PaginationError::NotAList {
                url: url.to_string(),
                key: list_key,
            })
        }
    };

    Ok(Page {
        items,
        list_key,
        total_count,
        offset,
        limit,
    })
}

fn integer_field(
    url: &str,
    envelope: &Map<String, Value>,
    field: &'static str,
) -> Result<u64, PaginationError> {
    envelope
        .get(field)
        .and_then(Value::as_u64)
        .ok_or_else(|| PaginationError::MissingField {
            url: url.to_string(),
            field,
        })
}

/// Position of the pagination loop between two requests.
enum Cursor {
    Start,
    At { offset: u64, list_key: String },
    Done,
}

/// Streams every item of an offset/limit listing.
///
/// Pages of `page_size` items are requested lazily, one at a time, as the
/// stream is polled. Dropping the stream early stops further requests.
pub fn paginate<'a>(
    transport: &'a dyn Transport,
    url: &'a str,
    query: Query,
    page_size: u32,
) -> impl Stream<Item = Result<Value, ClientError>> + Send + 'a {
    stream::try_unfold(Cursor::Start, move |cursor| {
        fetch_page(transport, url, query.clone(), page_size, cursor)
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
    .try_flatten()
}

async fn fetch_page(
    transport: &dyn Transport,
    url: &str,
    mut query: Query,
    page_size: u32,
    cursor: Cursor,
) -> Result<Option<(Vec<Value>, Cursor)>, ClientError> {
    let (offset, expected_key) = match cursor {
        Cursor::Done => return Ok(None),
        Cursor::Start => (0, None),
        Cursor::At { offset, list_key } => (offset, Some(list_key)),
    };

    query.push(("limit".to_string(), page_size.to_string()));
    if offset > 0 {
        query.push(("offset".to_string(), offset.to_string()));
    }

    debug!(url, offset, limit = page_size, "Fetching page");
    let response = transport.get(url, &query).await?;
    let page = parse_envelope(url, response, expected_key.as_deref())?;
    if page.offset != offset {
        return Err(PaginationError::UnexpectedOffset {
            url: url.to_string(),
            requested: offset,
            found: page.offset,
        }
        .into());
    }

    let next = match page.next_offset() {
        Some(offset) => Cursor::At {
            offset,
            list_key: page.list_key.clone(),
        },
        None => Cursor::Done,
    };
    Ok(Some((page.items, next)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{envelope, MockTransport};
    use serde_json::json;

    const URL: &str = "https://redmine.example.com/projects/demo/issues.json";

    fn issues(range: std::ops::Range<u64>) -> Vec<Value> {
        range.map(|id| json!({ "id": id })).collect()
    }

    fn mock_listing(total: u64, page_size: u64) -> MockTransport {
        let transport = MockTransport::new();
        let mut offset = 0;
        loop {
            let end = (offset + page_size).min(total);
            transport.on_get(
                URL,
                envelope("issues", issues(offset..end), total, offset, page_size),
            );
            offset += page_size;
            if offset >= total {
                break;
            }
        }
        transport
    }

    #[tokio::test]
    async fn yields_every_item_in_order() {
        let transport = mock_listing(250, 100);

        let items: Vec<Value> = paginate(&transport, URL, Query::new(), 100)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(items.len(), 250);
        let ids: Vec<u64> = items.iter().map(|i| i["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, (0..250).collect::<Vec<_>>());
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn exact_multiple_uses_no_extra_request() {
        let transport = mock_listing(200, 100);

        let items: Vec<Value> = paginate(&transport, URL, Query::new(), 100)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(items.len(), 200);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn sends_limit_and_offset() {
        let transport = mock_listing(30, 10);
        let base = crate::client::query(&[("status_id", "*")]);

        let _: Vec<Value> = paginate(&transport, URL, base, 10)
            .try_collect()
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].param("status_id"), Some("*"));
        assert_eq!(requests[0].param("limit"), Some("10"));
        assert_eq!(requests[0].param("offset"), None);
        assert_eq!(requests[1].param("offset"), Some("10"));
        assert_eq!(requests[2].param("offset"), Some("20"));
    }

    #[tokio::test]
    async fn empty_listing_uses_one_request() {
        let transport = MockTransport::new();
        transport.on_get(URL, envelope("issues", vec![], 0, 0, 100));

        let items: Vec<Value> = paginate(&transport, URL, Query::new(), 100)
            .try_collect()
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn stops_requesting_when_dropped() {
        let transport = mock_listing(250, 100);

        let first: Vec<Value> = paginate(&transport, URL, Query::new(), 100)
            .take(5)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn surfaces_envelope_errors() {
        let transport = MockTransport::new();
        transport.on_get(URL, json!({ "issues": [], "total_count": 0 }));

        let result: Result<Vec<Value>, ClientError> = paginate(&transport, URL, Query::new(), 100)
            .try_collect()
            .await;

        assert!(matches!(
            result,
            Err(ClientError::Pagination(PaginationError::NotPaginated { .. }))
        ));
    }

    #[test]
    fn detects_list_key_by_elimination() {
        let page = parse_envelope(URL, envelope("versions", issues(0..2), 2, 0, 25), None).unwrap();

        assert_eq!(page.list_key, "versions");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_offset(), None);
    }

    #[test]
    fn rejects_ambiguous_list_keys() {
        let response = json!({
            "issues": [],
            "users": [],
            "total_count": 0,
            "offset": 0,
            "limit": 25
        });

        let error = parse_envelope(URL, response, None).unwrap_err();
        assert_eq!(
            error,
            PaginationError::AmbiguousListKey {
                url: URL.to_string(),
                keys: vec!["issues".to_string(), "users".to_string()],
            }
        );
    }

    #[test]
    fn rejects_missing_list_key() {
        let response = json!({ "total_count": 0, "offset": 0, "limit": 25 });
        let error = parse_envelope(URL, response, None).unwrap_err();
        assert!(matches!(error, PaginationError::MissingListKey { .. }));
    }

    #[test]
    fn rejects_non_list_field() {
        let response = json!({ "issue": {}, "total_count": 1, "offset": 0, "limit": 25 });
        let error = parse_envelope(URL, response, None).unwrap_err();
        assert!(matches!(error, PaginationError::NotAList { .. }));
    }

    #[test]
    fn rejects_zero_limit() {
        let error = parse_envelope(URL, envelope("issues", vec![], 5, 0, 0), None).unwrap_err();
        assert!(matches!(error, PaginationError::ZeroLimit { .. }));
    }

    #[test]
    fn rejects_changed_list_key() {
        let error =
            parse_envelope(URL, envelope("users", vec![], 5, 0, 25), Some("issues")).unwrap_err();
        assert!(matches!(error, PaginationError::ListKeyChanged { .. }));
    }

    #[test]
    fn rejects_missing_total_count() {
        let response = json!({ "issues": [], "offset": 0, "limit": 25 });
        let error = parse_envelope(URL, response, None).unwrap_err();
        assert_eq!(
            error,
            PaginationError::MissingField {
                url: URL.to_string(),
                field: "total_count",
            }
        );
    }

    #[test]
    fn rejects_non_integer_limit() {
        let response = json!({ "issues": [], "total_count": 3, "offset": 0, "limit": "25" });
        let error = parse_envelope(URL, response, None).unwrap_err();
        assert_eq!(
            error,
            PaginationError::MissingField {
                url: URL.to_string(),
                field: "limit",
            }
        );
    }

    #[test]
    fn rejects_overflowing_offset() {
        let error = parse_envelope(URL, envelope("issues", vec![], u64::MAX, u64::MAX, 1), None)
            .unwrap_err();
        assert!(matches!(error, PaginationError::OffsetOverflow { .. }));
    }

    #[tokio::test]
    async fn advances_by_server_limit() {
        let transport = MockTransport::new();
        for offset in [0, 25, 50] {
            let end = (offset + 25).min(60);
            transport.on_get(URL, envelope("issues", issues(offset..end), 60, offset, 25));
        }

        let items: Vec<Value> = paginate(&transport, URL, Query::new(), 100)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(items.len(), 60);
        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].param("limit"), Some("100"));
        assert_eq!(requests[1].param("offset"), Some("25"));
        assert_eq!(requests[2].param("offset"), Some("50"));
    }

    #[tokio::test]
    async fn rejects_page_ignoring_offset() {
        let transport = MockTransport::new();
        for _ in 0..3 {
            transport.on_get(URL, envelope("issues", issues(0..100), 500, 0, 100));
        }

        let result: Result<Vec<Value>, ClientError> =
            paginate(&transport, URL, Query::new(), 100).try_collect().await;

        assert!(matches!(
            result,
            Err(ClientError::Pagination(PaginationError::UnexpectedOffset {
                requested: 100,
                found: 0,
                ..
            }))
        ));
        assert_eq!(transport.requests().len(), 2);
    }
}
