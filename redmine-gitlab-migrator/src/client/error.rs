//! REST client error types.

use thiserror::Error;

/// Errors raised while talking to a REST API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport level failure (connection, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// The response body is not valid JSON.
    #[error("Invalid JSON returned by '{url}': {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// An authentication header could not be built.
    #[error("Invalid value for header '{name}'")]
    InvalidHeader { name: String },

    /// Failed to write a downloaded file.
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The listing envelope is malformed.
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

/// Shape violations of a paginated listing envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    /// The response has no `offset` field.
    #[error("Response from '{url}' is not paginated")]
    NotPaginated { url: String },

    /// No list field remains once the envelope keys are removed.
    #[error("Response from '{url}' has no list field")]
    MissingListKey { url: String },

    /// More than one candidate list field.
    #[error("Response from '{url}' has ambiguous list fields: {keys:?}")]
    AmbiguousListKey { url: String, keys: Vec<String> },

    /// The detected list field does not hold an array.
    #[error("Field '{key}' in response from '{url}' is not a list")]
    NotAList { url: String, key: String },

    /// A numeric envelope field is missing or not an integer.
    #[error("Response from '{url}' has no integer '{field}' field")]
    MissingField { url: String, field: &'static str },

    /// The server reported a page size of zero.
    #[error("Response from '{url}' reports a zero page limit")]
    ZeroLimit { url: String },

    /// The page does not start at the requested offset.
    #[error("Response from '{url}' starts at offset {found} instead of {requested}")]
    UnexpectedOffset {
        url: String,
        requested: u64,
        found: u64,
    },

    /// `offset + limit` does not fit in 64 bits.
    #[error("Response from '{url}' has offset {offset} and limit {limit} overflowing")]
    OffsetOverflow { url: String, offset: u64, limit: u64 },

    /// A later page carries its items under a different key.
    #[error("Response from '{url}' lists items under '{found}' instead of '{expected}'")]
    ListKeyChanged {
        url: String,
        expected: String,
        found: String,
    },
}
