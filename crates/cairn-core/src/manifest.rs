//! Ordered chunk manifests.
//!
//! # Wire Format
//!
//! UTF-8 text: every chunk address followed by a `,` delimiter, including
//! the last one (`Qm..a,Qm..b,`). Addresses are base58 and never contain the
//! delimiter, so no escaping is needed. The trailing delimiter is stripped
//! before splitting; an empty blob is a manifest with no chunks.

use crate::address::ContentAddress;
use crate::error::{Error, Result};

/// Delimiter written after every manifest entry.
pub const MANIFEST_DELIMITER: char = ',';

/// File extension of manifest objects.
pub const MANIFEST_EXTENSION: &str = "manifest";

/// Ordered list of chunk addresses for one file.
///
/// Entry order is chunk index order; it is the only record of that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ContentAddress>,
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the address of the next chunk.
    pub fn push(&mut self, address: ContentAddress) {
        self.entries.push(address);
    }

    /// Chunk addresses in index order.
    pub fn entries(&self) -> &[ContentAddress] {
        &self.entries
    }

    /// Number of chunks listed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the manifest lists no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the manifest to its wire format.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.entries.len() * (crate::ADDRESS_LEN + 1));
        for entry in &self.entries {
            out.push_str(entry.as_str());
            out.push(MANIFEST_DELIMITER);
        }
        out
    }

    /// Parses a manifest blob.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedManifest`] if the blob is not UTF-8 or an
    /// entry is not a valid content address.
    pub fn decode(blob: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(blob)
            .map_err(|e| Error::malformed_manifest(format!("not valid UTF-8: {e}")))?;
        let text = text.strip_suffix(MANIFEST_DELIMITER).unwrap_or(text);

        if text.is_empty() {
            return Ok(Self::new());
        }

        let entries = text
            .split(MANIFEST_DELIMITER)
            .enumerate()
            .map(|(index, entry)| {
                ContentAddress::parse(entry).map_err(|e| {
                    Error::malformed_manifest(format!("entry {index} is invalid: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Object key of the manifest: `<pathPrefix><base>/<base>.manifest`.
    pub fn storage_key(path_prefix: &str, base: &ContentAddress) -> String {
        format!("{path_prefix}{base}/{base}.{MANIFEST_EXTENSION}")
    }
}

impl FromIterator<ContentAddress> for Manifest {
    fn from_iter<I: IntoIterator<Item = ContentAddress>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
