//! Generic REST client plumbing.
//!
//! All network access of the migrator goes through the [`Transport`] trait so
//! that the Redmine and GitLab accessors can be exercised against canned JSON.
//! [`HttpClient`] is the `reqwest` backed implementation used at runtime, and
//! [`paginate`] turns an offset/limit listing into a lazy stream of items.

mod error;
mod http;
mod pagination;
#[cfg(test)]
pub(crate) mod testing;

pub use error::{ClientError, PaginationError};
pub use http::HttpClient;
pub use pagination::{paginate, parse_envelope, Page, ENVELOPE_KEYS};

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Query string parameters, in request order.
pub type Query = Vec<(String, String)>;

/// Builds a [`Query`] from borrowed pairs.
#[must_use]
pub fn query(pairs: &[(&str, &str)]) -> Query {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

/// A JSON-over-HTTP transport.
///
/// Authentication is a property of the transport instance, so callers only
/// deal with URLs, query parameters and bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a `GET` and decodes the JSON body.
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Value, ClientError>;

    /// Performs a `POST` with a JSON body and decodes the JSON answer.
    async fn post(
        &self,
        url: &str,
        query: &[(String, String)],
        body: &Value,
    ) -> Result<Value, ClientError>;

    /// Performs a `PUT` with a JSON body and decodes the JSON answer.
    async fn put(
        &self,
        url: &str,
        query: &[(String, String)],
        body: &Value,
    ) -> Result<Value, ClientError>;

    /// Downloads a raw resource to `destination`, returning the byte count.
    async fn download(
        &self,
        url: &str,
        query: &[(String, String)],
        destination: &Path,
    ) -> Result<u64, ClientError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Value, ClientError> {
        (**self).get(url, query).await
    }

    async fn post(
        &self,
        url: &str,
        query: &[(String, String)],
        body: &Value,
    ) -> Result<Value, ClientError> {
        (**self).post(url, query, body).await
    }

    async fn put(
        &self,
        url: &str,
        query: &[(String, String)],
        body: &Value,
    ) -> Result<Value, ClientError> {
        (**self).put(url, query, body).await
    }

    async fn download(
        &self,
        url: &str,
        query: &[(String, String)],
        destination: &Path,
    ) -> Result<u64, ClientError> {
        (**self).download(url, query, destination).await
    }
}
