//! In-process provider backed by [`object_store::memory::InMemory`].

use std::collections::HashMap;
use std::sync::Arc;

use object_store::memory::InMemory;
use tokio::sync::Mutex;

use crate::TRACING_TARGET;
use crate::bucket::{BucketHandle, ObjectStoreProvider, StoreBucket};
use crate::client::ObjectStoreClient;
use crate::error::{Error, Result};

/// Keeps every bucket in memory. Buckets survive for the provider's lifetime.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    buckets: Mutex<HashMap<String, Arc<InMemory>>>,
}

impl MemoryProvider {
    /// Creates a provider with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with the given buckets already present.
    pub fn with_buckets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let buckets = names
            .into_iter()
            .map(|name| (name.into(), Arc::new(InMemory::new())))
            .collect();
        Self {
            buckets: Mutex::new(buckets),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStoreProvider for MemoryProvider {
    fn id(&self) -> &'static str {
        "memory"
    }

    async fn open_bucket(&self, name: &str) -> Result<Box<dyn BucketHandle>> {
        let buckets = self.buckets.lock().await;
        let store = buckets
            .get(name)
            .cloned()
            .ok_or_else(|| Error::bucket_not_found(name))?;

        let client = ObjectStoreClient::from_arc(store);
        Ok(Box::new(StoreBucket::new(name, client)))
    }

    async fn create_bucket(&self, name: &str) -> Result<()> {
        let mut buckets = self.buckets.lock().await;
        buckets
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(InMemory::new()));
        tracing::debug!(target: TRACING_TARGET, bucket = name, "Created in-memory bucket");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::ErrorKind;

    #[tokio::test]
    async fn missing_bucket_is_reported() {
        let provider = MemoryProvider::new();
        let Err(err) = provider.open_bucket("nope").await else {
            panic!("opening a missing bucket should fail");
        };
        assert_eq!(err.kind(), ErrorKind::BucketNotFound);
    }

    #[tokio::test]
    async fn objects_survive_reopen() {
        let provider = MemoryProvider::new();
        provider.create_bucket("b").await.unwrap();

        let bucket = provider.open_bucket("b").await.unwrap();
        bucket.put("a/b", Bytes::from("data")).await.unwrap();
        bucket.close().await.unwrap();

        let bucket = provider.open_bucket("b").await.unwrap();
        assert_eq!(bucket.get("a/b").await.unwrap(), Bytes::from("data"));
    }

    #[tokio::test]
    async fn create_is_idempotent() {
        let provider = MemoryProvider::with_buckets(["b"]);
        provider
            .open_bucket("b")
            .await
            .unwrap()
            .put("k", Bytes::from("v"))
            .await
            .unwrap();

        provider.create_bucket("b").await.unwrap();
        let bucket = provider.open_bucket("b").await.unwrap();
        assert!(bucket.get("k").await.is_ok());
    }
}
