//! The content store abstraction.

use bytes::Bytes;
use cairn_core::ContentAddress;
use tokio::io::AsyncRead;

use crate::error::Result;

/// A content-addressed blob store.
///
/// Identical bytes always yield identical addresses within one store.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Computes the address of a stream without storing it.
    ///
    /// The reader is consumed to its end.
    async fn address_of(&self, reader: &mut (dyn AsyncRead + Unpin + Send)) -> Result<ContentAddress>;

    /// Computes the address of an in-memory buffer without storing it.
    async fn address_of_bytes(&self, data: Bytes) -> Result<ContentAddress>;

    /// Stores `data` and returns its address.
    async fn add(&self, data: Bytes) -> Result<ContentAddress>;

    /// Retrieves the bytes stored under `address`.
    async fn fetch(&self, address: &ContentAddress) -> Result<Bytes>;

    /// Checks that the store is reachable.
    async fn verify(&self) -> Result<()>;
}
