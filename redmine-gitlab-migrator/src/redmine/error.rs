//! Redmine accessor error types.

use crate::client::ClientError;
use thiserror::Error;

/// Errors that can occur while reading from Redmine.
#[derive(Debug, Error)]
pub enum RedmineError {
    /// Transport or envelope error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The configured project URL cannot be understood.
    #[error("Invalid Redmine project URL '{url}': {reason}")]
    InvalidProjectUrl { url: String, reason: String },

    /// A resource does not have the expected shape.
    #[error("Unexpected response from '{url}': {source}")]
    UnexpectedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
