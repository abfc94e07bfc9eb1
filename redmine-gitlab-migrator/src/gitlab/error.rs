//! GitLab accessor error types.

use crate::client::ClientError;
use thiserror::Error;

/// Errors that can occur while writing to GitLab.
#[derive(Debug, Error)]
pub enum GitlabError {
    /// Transport error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The configured project URL cannot be understood.
    #[error("Invalid GitLab project URL '{url}': {reason}")]
    InvalidProjectUrl { url: String, reason: String },

    /// A request payload cannot be encoded.
    #[error("Cannot encode payload for '{url}': {source}")]
    InvalidPayload {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A response does not have the expected shape.
    #[error("Unexpected response from '{url}': {source}")]
    UnexpectedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
