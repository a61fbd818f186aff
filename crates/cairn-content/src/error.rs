//! Error types for cairn-content.

use cairn_core::ContentAddress;
use thiserror::Error;

/// Result type alias for cairn-content operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for content store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The node could not be reached (connection refused, timeout).
    #[error("content store unreachable: {0}")]
    NodeUnreachable(#[source] reqwest::Error),

    /// The node returned something that is not a valid content address.
    #[error("invalid content address: {0}")]
    InvalidAddress(#[from] cairn_core::Error),

    /// No content is stored under the address.
    #[error("content not found: {0}")]
    NotFound(ContentAddress),

    /// The HTTP request failed.
    #[error("HTTP error: {0}")]
    Request(#[source] reqwest::Error),

    /// The configured endpoint is not a usable URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The node answered with an unexpected status or body.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Reading the local source failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::NodeUnreachable(err)
        } else {
            Self::Request(err)
        }
    }
}
