//! Fixed-size chunking of source streams.

mod splitter;

use bytes::Bytes;

pub use splitter::{ChunkSlice, ChunkSplitter};

use crate::address::ContentAddress;
use crate::error::{Error, Result};

/// Number of chunks a stream of `total_size` bytes splits into.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] if `chunk_size` is zero.
pub fn chunk_count(total_size: u64, chunk_size: usize) -> Result<u64> {
    if chunk_size == 0 {
        return Err(Error::invalid_configuration("chunk size must be positive"));
    }
    Ok(total_size.div_ceil(chunk_size as u64))
}

/// One encrypted slice of a source file, ready for upload.
///
/// Chunks are immutable once sealed and never outlive the pipeline run that
/// produced them.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Ordinal position in the source file, 0-based and contiguous.
    pub index: usize,
    /// Plaintext bytes of the slice.
    pub raw: Bytes,
    /// Ciphertext bytes, as stored.
    pub cipher: Bytes,
    /// Content address of [`Chunk::cipher`].
    pub address: ContentAddress,
}

impl Chunk {
    /// Creates a chunk from its parts.
    pub fn new(index: usize, raw: Bytes, cipher: Bytes, address: ContentAddress) -> Self {
        Self {
            index,
            raw,
            cipher,
            address,
        }
    }

    /// Returns the object key this chunk is stored under.
    pub fn storage_key(&self, path_prefix: &str, base: &ContentAddress) -> String {
        chunk_key(path_prefix, base, &self.address)
    }
}

/// Object key of a chunk: `<pathPrefix><base>/<chunk>`.
pub fn chunk_key(path_prefix: &str, base: &ContentAddress, chunk: &ContentAddress) -> String {
    format!("{path_prefix}{base}/{chunk}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_rounds_up() {
        assert_eq!(chunk_count(10, 4).unwrap(), 3);
        assert_eq!(chunk_count(8, 4).unwrap(), 2);
        assert_eq!(chunk_count(1, 4).unwrap(), 1);
        assert_eq!(chunk_count(0, 4).unwrap(), 0);
    }

    #[test]
    fn count_rejects_zero_chunk_size() {
        assert!(matches!(
            chunk_count(10, 0),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn storage_key_layout() {
        let base = ContentAddress::digest(b"file");
        let chunk = Chunk::new(
            0,
            Bytes::from_static(b"raw"),
            Bytes::from_static(b"cipher"),
            ContentAddress::digest(b"cipher"),
        );
        assert_eq!(
            chunk.storage_key("backups/", &base),
            format!("backups/{base}/{}", chunk.address)
        );
    }
}
