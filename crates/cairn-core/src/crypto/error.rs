//! Cryptographic error types.

use thiserror::Error;

/// Result type for cryptographic operations.
pub type CryptoResult<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The provided key does not have the cipher's key size.
    #[error("invalid key: expected {expected} bytes, got {actual}")]
    InvalidKey {
        /// Required key length in bytes.
        expected: usize,
        /// Length of the rejected key material.
        actual: usize,
    },
    /// The ciphertext is truncated, tampered with, or sealed under another key.
    #[error("corrupt ciphertext: {0}")]
    CorruptCiphertext(&'static str),
    /// The decrypted payload is not valid base64.
    #[error("decoding error: {0}")]
    DecodingError(String),
    /// Encryption could not be performed.
    #[error("encryption failed")]
    EncryptionFailed,
}
