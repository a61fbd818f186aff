//! Local filesystem provider using [`object_store::local::LocalFileSystem`].
//!
//! Each bucket is a directory under the provider root.

use std::path::{Path, PathBuf};

use object_store::local::LocalFileSystem;

use crate::TRACING_TARGET;
use crate::bucket::{BucketHandle, ObjectStoreProvider, StoreBucket};
use crate::client::ObjectStoreClient;
use crate::error::{Error, Result};

/// Stores buckets as directories under `root`.
#[derive(Debug, Clone)]
pub struct LocalProvider {
    root: PathBuf,
}

impl LocalProvider {
    /// Creates a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory holding the buckets.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(Error::configuration(format!(
                "'{name}' is not a valid bucket name"
            )));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait::async_trait]
impl ObjectStoreProvider for LocalProvider {
    fn id(&self) -> &'static str {
        "local"
    }

    async fn open_bucket(&self, name: &str) -> Result<Box<dyn BucketHandle>> {
        let dir = self.bucket_dir(name)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(Error::configuration(format!(
                    "bucket path '{}' is not a directory",
                    dir.display()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::bucket_not_found(name));
            }
            Err(e) => {
                return Err(Error::permission_denied(format!(
                    "cannot access bucket '{}'",
                    dir.display()
                ))
                .with_source(e));
            }
        }

        let store = LocalFileSystem::new_with_prefix(&dir)?;
        tracing::debug!(target: TRACING_TARGET, bucket = name, path = %dir.display(), "Opened local bucket");
        Ok(Box::new(StoreBucket::new(name, ObjectStoreClient::new(store))))
    }

    async fn create_bucket(&self, name: &str) -> Result<()> {
        let dir = self.bucket_dir(name)?;
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::permission_denied(format!("cannot create bucket '{}'", dir.display()))
                .with_source(e)
        })?;
        tracing::info!(target: TRACING_TARGET, bucket = name, path = %dir.display(), "Created local bucket");
        Ok(())
    }
}
