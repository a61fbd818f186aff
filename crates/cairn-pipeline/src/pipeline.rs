//! The pipeline service.

use std::sync::Arc;

use bytes::Bytes;
use cairn_content::ContentStore;
use cairn_core::{ContentAddress, Locator, RetryError, retry};
use cairn_object::{BucketHandle, ObjectStoreProvider};

use crate::config::{Destination, PipelineConfig, PipelineKeys};
use crate::error::{Error, Result};
use crate::session;

/// Name of the sample object written by [`Pipeline::probe`].
const PROBE_OBJECT: &str = "testdata";

/// Mirrors files between a content store and an object store.
///
/// Holds the two stores, the run configuration and the keys. Cheap to clone.
#[derive(Clone)]
pub struct Pipeline {
    pub(crate) content: Arc<dyn ContentStore>,
    pub(crate) objects: Arc<dyn ObjectStoreProvider>,
    pub(crate) config: PipelineConfig,
    pub(crate) keys: PipelineKeys,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("objects", &self.objects.id())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline over the given stores.
    pub fn new(
        content: Arc<dyn ContentStore>,
        objects: Arc<dyn ObjectStoreProvider>,
        config: PipelineConfig,
        keys: PipelineKeys,
    ) -> Self {
        Self {
            content,
            objects,
            config,
            keys,
        }
    }

    /// Checks that the content store is reachable.
    pub async fn verify_content_store(&self) -> Result<()> {
        Ok(self.content.verify().await?)
    }

    /// Publishes a locator to the content store and returns its shareable
    /// address.
    pub async fn publish_locator(&self, locator: &Locator) -> Result<ContentAddress> {
        let address = self.content.add(locator.to_bytes()).await?;
        tracing::info!(
            target: crate::upload::TRACING_TARGET,
            shareable = %address,
            base = %locator.base(),
            "Published locator"
        );
        Ok(address)
    }

    /// Writes a small sample object to `<prefix>testdata` to check that the
    /// destination accepts uploads. Returns the object key.
    pub async fn probe(&self, destination: &Destination, sample: Bytes) -> Result<String> {
        self.config.validate()?;
        let bucket = session::open(self.objects.as_ref(), destination.bucket(), true).await?;

        let key = format!("{}{PROBE_OBJECT}", destination.path_prefix());
        let result = self.put_with_retry(bucket.as_ref(), &key, sample, None).await;
        session::close(bucket.as_ref()).await;

        result.map(|()| key)
    }

    /// Stores one object, retrying transient failures up to the configured
    /// bound.
    pub(crate) async fn put_with_retry(
        &self,
        bucket: &dyn BucketHandle,
        key: &str,
        data: Bytes,
        chunk_index: Option<usize>,
    ) -> Result<()> {
        let outcome = retry(
            self.config.max_attempts,
            cairn_object::Error::is_retryable,
            |attempt| {
                let data = data.clone();
                async move {
                    tracing::trace!(
                        target: crate::upload::TRACING_TARGET,
                        key,
                        attempt,
                        size = data.len(),
                        "Putting object"
                    );
                    bucket.put(key, data).await
                }
            },
        )
        .await;

        outcome.map_err(|RetryError { attempts, error }| Error::UploadFailed {
            key: key.to_owned(),
            chunk_index,
            attempts,
            source: error,
        })
    }

    /// Reads one object, retrying transient failures up to the configured
    /// bound.
    pub(crate) async fn get_with_retry(
        &self,
        bucket: &dyn BucketHandle,
        key: &str,
        chunk_index: Option<usize>,
    ) -> Result<Bytes> {
        retry(
            self.config.max_attempts,
            cairn_object::Error::is_retryable,
            |_| bucket.get(key),
        )
        .await
        .map_err(|RetryError { error, .. }| Error::download(key, chunk_index, error))
    }
}
