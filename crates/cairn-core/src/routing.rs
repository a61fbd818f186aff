//! Routing payloads.
//!
//! A [`RoutingPayload`] tells the download side where the encrypted chunks
//! live and what the reconstructed file was called. It travels encrypted
//! inside the locator.
//!
//! # Wire Format
//!
//! Three fields joined by `,`: `bucket,pathPrefix,fileName`. Inside a field
//! a `\` escapes the next character, so `\,` is a literal comma and `\\` a
//! literal backslash. Fields containing neither character serialize to the
//! plain join.

use crate::TRACING_TARGET;
use crate::crypto::{self, EncryptionKey};
use crate::error::{Error, Result};

const FIELD_DELIMITER: char = ',';
const ESCAPE: char = '\\';
const FIELD_COUNT: usize = 3;

/// Where a mirrored file lives and what it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPayload {
    /// Object store bucket holding the chunks.
    pub bucket: String,
    /// Key prefix under the bucket; empty or ending in `/`.
    pub path_prefix: String,
    /// File name used when the file is reconstructed.
    pub file_name: String,
}

impl RoutingPayload {
    /// Creates a payload, normalizing `path_prefix`.
    pub fn new(
        bucket: impl Into<String>,
        path_prefix: impl AsRef<str>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            path_prefix: normalize_prefix(path_prefix.as_ref()),
            file_name: file_name.into(),
        }
    }

    /// Serializes the payload to its wire format.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(
            self.bucket.len() + self.path_prefix.len() + self.file_name.len() + 2,
        );
        escape_into(&mut out, &self.bucket);
        out.push(FIELD_DELIMITER);
        escape_into(&mut out, &self.path_prefix);
        out.push(FIELD_DELIMITER);
        escape_into(&mut out, &self.file_name);
        out
    }

    /// Parses a serialized payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRoutingPayload`] unless the text holds
    /// exactly three fields, or if it ends in a dangling escape.
    pub fn decode(text: &str) -> Result<Self> {
        let mut fields = Vec::with_capacity(FIELD_COUNT);
        let mut current = String::new();
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            match c {
                ESCAPE => match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => return Err(Error::malformed_routing("dangling escape at end")),
                },
                FIELD_DELIMITER => fields.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        fields.push(current);

        let [bucket, path_prefix, file_name]: [String; FIELD_COUNT] =
            fields.try_into().map_err(|fields: Vec<String>| {
                Error::malformed_routing(format!(
                    "expected {FIELD_COUNT} fields, found {}",
                    fields.len()
                ))
            })?;

        Ok(Self {
            bucket,
            path_prefix,
            file_name,
        })
    }

    /// Encrypts the serialized payload with the routing key.
    pub fn seal(&self, key: &EncryptionKey) -> Result<Vec<u8>> {
        let sealed = crypto::encrypt(key, self.encode().as_bytes())?;
        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %self.bucket,
            size = sealed.len(),
            "Sealed routing payload"
        );
        Ok(sealed)
    }

    /// Decrypts and parses a payload produced by [`seal`](Self::seal).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] if decryption fails and
    /// [`Error::MalformedRoutingPayload`] if the plaintext does not parse.
    pub fn open(key: &EncryptionKey, sealed: &[u8]) -> Result<Self> {
        let plaintext = crypto::decrypt(key, sealed)?;
        let text = String::from_utf8(plaintext)
            .map_err(|e| Error::malformed_routing(format!("not valid UTF-8: {e}")))?;
        Self::decode(&text)
    }
}

/// Ensures a non-empty path prefix ends with `/`.
///
/// An empty prefix stays empty so objects land at the bucket root.
pub fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_owned()
    } else {
        format!("{prefix}/")
    }
}

fn escape_into(out: &mut String, field: &str) {
    for c in field.chars() {
        if c == ESCAPE || c == FIELD_DELIMITER {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}
