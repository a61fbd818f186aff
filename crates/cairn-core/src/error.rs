//! Core error types.

use thiserror::Error;

use crate::crypto::CryptoError;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with the core [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the core codecs.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is out of range (chunk size, retry bound, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The locator token could not be unpacked.
    #[error("malformed locator: {0}")]
    MalformedLocator(String),

    /// The manifest blob could not be parsed.
    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    /// The decrypted routing payload could not be parsed.
    #[error("malformed routing payload: {0}")]
    MalformedRoutingPayload(String),

    /// Encryption or decryption failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Reading the source stream failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new malformed locator error.
    pub fn malformed_locator(msg: impl Into<String>) -> Self {
        Self::MalformedLocator(msg.into())
    }

    /// Creates a new malformed manifest error.
    pub fn malformed_manifest(msg: impl Into<String>) -> Self {
        Self::MalformedManifest(msg.into())
    }

    /// Creates a new malformed routing payload error.
    pub fn malformed_routing(msg: impl Into<String>) -> Self {
        Self::MalformedRoutingPayload(msg.into())
    }
}
