//! Bucket provider and handle traits.

use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;

use crate::TRACING_TARGET;
use crate::client::ObjectStoreClient;
use crate::error::{Error, ErrorKind, Result};

/// Opens and creates buckets on one object store account.
#[async_trait::async_trait]
pub trait ObjectStoreProvider: Send + Sync {
    /// Short backend identifier (e.g. "memory", "local", "s3").
    fn id(&self) -> &'static str;

    /// Opens an existing bucket.
    ///
    /// Fails with [`ErrorKind::BucketNotFound`] if the bucket does not exist.
    async fn open_bucket(&self, name: &str) -> Result<Box<dyn BucketHandle>>;

    /// Creates a bucket. Creating an existing bucket is not an error.
    async fn create_bucket(&self, name: &str) -> Result<()>;
}

/// An open bucket session.
///
/// Callers must [`close`](Self::close) the handle on every exit path.
#[async_trait::async_trait]
pub trait BucketHandle: Send + Sync {
    /// Name of the bucket.
    fn name(&self) -> &str;

    /// Stores `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Reads the whole object stored under `key`.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Deletes the object stored under `key`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Releases the session. Further calls fail.
    async fn close(&self) -> Result<()>;
}

/// [`BucketHandle`] over an [`ObjectStoreClient`] scoped to one bucket.
#[derive(Debug)]
pub(crate) struct StoreBucket {
    name: String,
    client: ObjectStoreClient,
    closed: AtomicBool,
}

impl StoreBucket {
    pub(crate) fn new(name: impl Into<String>, client: ObjectStoreClient) -> Self {
        Self {
            name: name.into(),
            client,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::new(
                ErrorKind::Other,
                format!("bucket '{}' session is closed", self.name),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BucketHandle for StoreBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        self.ensure_open()?;
        self.client.put(key, data).await
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.ensure_open()?;
        self.client.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.ensure_open()?;
        self.client.delete(key).await
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(target: TRACING_TARGET, bucket = %self.name, "Closed bucket session");
        }
        Ok(())
    }
}
