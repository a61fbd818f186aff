//! Object store client backed by [`object_store::ObjectStore`].
//!
//! [`ObjectStoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` scoped to one bucket. Every public method is
//! instrumented with [`tracing`].

use std::sync::Arc;

use bytes::Bytes;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};

use crate::error::{Error, Result};

/// Key probed by [`ObjectStoreClient::verify_reachable`].
const PROBE_KEY: &str = "_cairn_verify_probe";

/// Cloneable handle to any [`ObjectStore`] backend.
///
/// All methods accept string keys and convert them to
/// [`object_store::path::Path`] internally.
#[derive(Clone, Debug)]
pub struct ObjectStoreClient(Arc<dyn ObjectStore>);

impl ObjectStoreClient {
    /// Wraps a concrete [`ObjectStore`] implementation.
    pub fn new(store: impl ObjectStore) -> Self {
        Self(Arc::new(store))
    }

    /// Wraps an already shared store.
    pub fn from_arc(store: Arc<dyn ObjectStore>) -> Self {
        Self(store)
    }

    /// Verifies that the backing store is reachable.
    ///
    /// Issues a HEAD for a probe key; a not-found response counts as
    /// success.
    #[tracing::instrument(name = "object.verify", skip(self))]
    pub async fn verify_reachable(&self) -> Result<()> {
        match self.0.head(&Path::from(PROBE_KEY)).await {
            Ok(_) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Retrieves the bytes stored at `key`.
    #[tracing::instrument(name = "object.get", skip(self), fields(key))]
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        let path = parse_key(key)?;
        let result = self.0.get(&path).await.map_err(Error::from)?;
        Ok(result.bytes().await?)
    }

    /// Uploads `data` to `key`, replacing any existing object.
    #[tracing::instrument(name = "object.put", skip(self, data), fields(key, size = data.len()))]
    pub async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let path = parse_key(key)?;
        self.0.put(&path, PutPayload::from(data)).await?;
        Ok(())
    }

    /// Deletes the object at `key`.
    #[tracing::instrument(name = "object.delete", skip(self), fields(key))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = parse_key(key)?;
        Ok(self.0.delete(&path).await?)
    }
}

/// Parses a `/`-separated key, rejecting empty segments and `..`.
fn parse_key(key: &str) -> Result<Path> {
    Path::parse(key).map_err(|e| {
        Error::configuration(format!("invalid object key '{key}'")).with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use object_store::memory::InMemory;

    use super::*;
    use crate::ErrorKind;

    fn test_client() -> ObjectStoreClient {
        ObjectStoreClient::new(InMemory::new())
    }

    #[tokio::test]
    async fn put_and_get() {
        let client = test_client();
        let data = Bytes::from("hello world");
        client.put("dir/test.txt", data.clone()).await.unwrap();

        assert_eq!(client.get("dir/test.txt").await.unwrap(), data);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let client = test_client();
        client.put("k", Bytes::from("first")).await.unwrap();
        client.put("k", Bytes::from("second")).await.unwrap();

        assert_eq!(client.get("k").await.unwrap(), Bytes::from("second"));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let client = test_client();
        let err = client.get("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn delete() {
        let client = test_client();
        client.put("del.bin", Bytes::from("x")).await.unwrap();
        client.delete("del.bin").await.unwrap();

        assert!(client.get("del.bin").await.is_err());
    }

    #[tokio::test]
    async fn invalid_key_is_configuration_error() {
        let client = test_client();
        let err = client.put("a//b", Bytes::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn verify_reachable() {
        test_client().verify_reachable().await.unwrap();
    }
}
