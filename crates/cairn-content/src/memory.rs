//! In-process content store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use cairn_core::{AddressHasher, ContentAddress};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::store::ContentStore;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Content store that keeps blobs in memory and addresses them by the
/// CIDv0 form of their sha2-256 digest.
///
/// Counts every call so tests can assert how often the store was used.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<ContentAddress, Bytes>>,
    calls: AtomicUsize,
}

impl MemoryContentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trait calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Returns `true` if nothing has been added.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait::async_trait]
impl ContentStore for MemoryContentStore {
    async fn address_of(&self, reader: &mut (dyn AsyncRead + Unpin + Send)) -> Result<ContentAddress> {
        self.record_call();
        let mut hasher = AddressHasher::new();
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(hasher.finalize())
    }

    async fn address_of_bytes(&self, data: Bytes) -> Result<ContentAddress> {
        self.record_call();
        Ok(ContentAddress::digest(&data))
    }

    async fn add(&self, data: Bytes) -> Result<ContentAddress> {
        self.record_call();
        let address = ContentAddress::digest(&data);
        self.blobs.write().await.insert(address.clone(), data);
        Ok(address)
    }

    async fn fetch(&self, address: &ContentAddress) -> Result<Bytes> {
        self.record_call();
        self.blobs
            .read()
            .await
            .get(address)
            .cloned()
            .ok_or_else(|| Error::NotFound(address.clone()))
    }

    async fn verify(&self) -> Result<()> {
        self.record_call();
        Ok(())
    }
}
