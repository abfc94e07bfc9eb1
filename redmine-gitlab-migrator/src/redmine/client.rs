//! Redmine flavoured REST client.

use super::RedmineError;
use crate::client::{paginate, ClientError, HttpClient, Query, Transport};
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

/// Header carrying the Redmine API key.
pub const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Largest page size Redmine accepts.
pub const PAGE_MAX_SIZE: u32 = 100;

/// Thin wrapper adding Redmine conventions on top of a [`Transport`].
pub struct RedmineClient {
    transport: Box<dyn Transport>,
    page_size: u32,
}

impl RedmineClient {
    /// Creates a client over an arbitrary transport.
    #[must_use]
    pub fn new(transport: Box<dyn Transport>, page_size: u32) -> Self {
        Self {
            transport,
            page_size: page_size.clamp(1, PAGE_MAX_SIZE),
        }
    }

    /// Creates an HTTP client authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::Client`] if the HTTP client cannot be built.
    pub fn with_api_key(api_key: &str, page_size: u32) -> Result<Self, RedmineError> {
        let http = HttpClient::new(API_KEY_HEADER, api_key)?;
        Ok(Self::new(Box::new(http), page_size))
    }

    /// Fetches a detail resource.
    ///
    /// Detail views wrap a `foo` object under a `"foo"` key; a response with a
    /// single top-level key is unwrapped before decoding.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError`] on transport failures or if the payload does
    /// not decode into `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, RedmineError> {
        let response = self.transport.get(url, query).await?;
        decode(url, unwrap_single_key(response))
    }

    /// Fetches a resource without unwrapping it.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError`] on transport failures or decoding errors.
    pub async fn get_raw<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, RedmineError> {
        let response = self.transport.get(url, query).await?;
        decode(url, response)
    }

    /// Streams every item of a paginated listing.
    pub fn list<'a>(
        &'a self,
        url: &'a str,
        query: Query,
    ) -> impl Stream<Item = Result<Value, ClientError>> + Send + 'a {
        paginate(&*self.transport, url, query, self.page_size)
    }

    /// Downloads an attachment; Redmine expects the key as a query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::Client`] if the download or the write fails.
    pub async fn download(
        &self,
        url: &str,
        api_key: &str,
        destination: &Path,
    ) -> Result<u64, RedmineError> {
        let query = vec![("key".to_string(), api_key.to_string())];
        Ok(self.transport.download(url, &query, destination).await?)
    }
}

/// Returns the inner value of a single-key object, or the value unchanged.
#[must_use]
pub fn unwrap_single_key(value: Value) -> Value {
    match value {
        Value::Object(map) if map.len() == 1 => map
            .into_iter()
            .next()
            .map(|(_, inner)| inner)
            .unwrap_or(Value::Null),
        other => other,
    }
}

pub(crate) fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T, RedmineError> {
    serde_json::from_value(value).map_err(|source| RedmineError::UnexpectedResponse {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_detail_envelope() {
        let unwrapped = unwrap_single_key(json!({ "user": { "id": 3, "login": "jdoe" } }));
        assert_eq!(unwrapped, json!({ "id": 3, "login": "jdoe" }));
    }

    #[test]
    fn keeps_multi_key_objects() {
        let value = json!({ "versions": [], "total_count": 0 });
        assert_eq!(unwrap_single_key(value.clone()), value);
    }

    #[test]
    fn clamps_page_size() {
        let transport = crate::client::testing::MockTransport::new();
        let client = RedmineClient::new(Box::new(transport), 500);
        assert_eq!(client.page_size, PAGE_MAX_SIZE);
    }
}
