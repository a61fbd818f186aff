//! Content addresses.
//!
//! A [`ContentAddress`] names a byte buffer by its content. The native format
//! is the CIDv0 string form: base58btc over the sha2-256 multihash
//! (`0x12 0x20 || digest`), which always renders as 46 characters starting
//! with `Qm`. Locators rely on that fixed length for framing.

use std::fmt;
use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Length of a rendered content address, in characters (and bytes).
pub const ADDRESS_LEN: usize = 46;

/// Prefix shared by every rendered content address.
pub const ADDRESS_PREFIX: &str = "Qm";

/// Multihash code for sha2-256.
const SHA2_256_CODE: u8 = 0x12;

/// Digest length of sha2-256, as encoded in the multihash header.
const SHA2_256_LEN: u8 = 32;

/// A validated content address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Parses and validates an address string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedLocator`] if `s` does not have the expected
    /// prefix, length, or base58 alphabet.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != ADDRESS_LEN {
            return Err(Error::malformed_locator(format!(
                "content address must be {ADDRESS_LEN} characters, got {}",
                s.len()
            )));
        }

        if !s.starts_with(ADDRESS_PREFIX) {
            return Err(Error::malformed_locator(format!(
                "content address must start with '{ADDRESS_PREFIX}'"
            )));
        }

        bs58::decode(s)
            .into_vec()
            .map_err(|e| Error::malformed_locator(format!("content address is not base58: {e}")))?;

        Ok(Self(s.to_owned()))
    }

    /// Computes the address of an in-memory buffer.
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = AddressHasher::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Builds an address from a raw sha2-256 digest.
    pub fn from_sha256(digest: &[u8; 32]) -> Self {
        let mut multihash = Vec::with_capacity(2 + digest.len());
        multihash.push(SHA2_256_CODE);
        multihash.push(SHA2_256_LEN);
        multihash.extend_from_slice(digest);
        Self(bs58::encode(multihash).into_string())
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the address as bytes, as written into a locator.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl AsRef<str> for ContentAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContentAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ContentAddress> for String {
    fn from(value: ContentAddress) -> Self {
        value.0
    }
}

/// Incremental address computation for streams that must not be buffered.
#[derive(Clone, Default)]
pub struct AddressHasher {
    inner: Sha256,
    bytes: u64,
}

impl AddressHasher {
    /// Creates an empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds more bytes into the hasher.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.bytes += data.len() as u64;
    }

    /// Number of bytes hashed so far.
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes
    }

    /// Consumes the hasher and returns the address.
    pub fn finalize(self) -> ContentAddress {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&self.inner.finalize());
        ContentAddress::from_sha256(&digest)
    }
}

impl fmt::Debug for AddressHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressHasher")
            .field("bytes", &self.bytes)
            .finish_non_exhaustive()
    }
}
