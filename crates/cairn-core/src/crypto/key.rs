//! Symmetric key material.

use std::fmt;
use std::str::FromStr;

use chacha20poly1305::XChaCha20Poly1305;
use chacha20poly1305::aead::{KeyInit, OsRng};

use super::error::{CryptoError, CryptoResult};

/// Size of an [`EncryptionKey`] in bytes.
pub const KEY_SIZE: usize = 32;

/// A 256-bit XChaCha20-Poly1305 key.
///
/// Keys are injected by the caller (configuration file, environment) and are
/// never compiled into the binary. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Generates a new random key from the operating system RNG.
    pub fn generate() -> Self {
        let key = XChaCha20Poly1305::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&key);
        Self(bytes)
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] unless `bytes` is exactly
    /// [`KEY_SIZE`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidKey {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(key))
    }

    /// Parses a key from configuration text.
    ///
    /// Accepts either 64 hexadecimal characters or a string whose UTF-8
    /// encoding is exactly 32 bytes.
    pub fn parse(text: &str) -> CryptoResult<Self> {
        if text.len() == KEY_SIZE * 2
            && let Ok(bytes) = hex::decode(text)
        {
            return Self::from_slice(&bytes);
        }

        Self::from_slice(text.as_bytes())
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Returns the key as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for EncryptionKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}
