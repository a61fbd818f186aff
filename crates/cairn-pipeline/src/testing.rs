//! Shared fixtures for pipeline tests.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use cairn_content::MemoryContentStore;
use cairn_core::{ContentAddress, EncryptionKey};
use cairn_object::ObjectStoreProvider;
use cairn_object::mock::{MockProvider, MockStats};

use crate::{Pipeline, PipelineConfig, PipelineKeys, UploadSource};

pub(crate) const BUCKET: &str = "mirror";
pub(crate) const PREFIX: &str = "files/";

pub(crate) struct Harness {
    pub pipeline: Pipeline,
    pub content: Arc<MemoryContentStore>,
    pub provider: Arc<MockProvider>,
    pub stats: Arc<MockStats>,
    pub keys: PipelineKeys,
}

impl Harness {
    pub fn new(provider: MockProvider, config: PipelineConfig) -> Self {
        let keys = PipelineKeys::new(EncryptionKey::generate(), EncryptionKey::generate());
        Self::with_keys(provider, config, keys)
    }

    pub fn with_keys(provider: MockProvider, config: PipelineConfig, keys: PipelineKeys) -> Self {
        let content = Arc::new(MemoryContentStore::new());
        let provider = Arc::new(provider);
        let stats = provider.stats();
        let pipeline = Pipeline::new(
            content.clone(),
            provider.clone() as Arc<dyn ObjectStoreProvider>,
            config,
            keys.clone(),
        );
        Self {
            pipeline,
            content,
            provider,
            stats,
            keys,
        }
    }

    /// A second pipeline over the same stores with different settings.
    pub fn sibling(&self, config: PipelineConfig, keys: PipelineKeys) -> Pipeline {
        Pipeline::new(
            self.content.clone(),
            self.provider.clone() as Arc<dyn ObjectStoreProvider>,
            config,
            keys,
        )
    }

    /// Reads an object directly from the backing store, bypassing counters.
    pub async fn stored(&self, key: &str) -> Option<Bytes> {
        let bucket = self.provider.inner().open_bucket(BUCKET).await.ok()?;
        bucket.get(key).await.ok()
    }
}

pub(crate) fn source(data: &[u8], name: &str) -> UploadSource<Cursor<Vec<u8>>> {
    UploadSource::new(Cursor::new(data.to_vec()), data.len() as u64, name)
}

pub(crate) fn base_of(data: &[u8]) -> ContentAddress {
    ContentAddress::digest(data)
}
