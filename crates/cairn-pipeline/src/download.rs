//! Download: resolve a locator and reassemble the original file.

use std::path::{Path, PathBuf};

use cairn_core::crypto::decrypt;
use cairn_core::{ContentAddress, Locator, Manifest, RoutingPayload, chunk_key, normalize_prefix};
use cairn_object::BucketHandle;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::validate_file_name;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::session;

/// Tracing target for download runs.
pub const TRACING_TARGET: &str = "cairn_pipeline::download";

/// Outcome of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Path of the reconstructed file.
    pub path: PathBuf,
    /// Original file name, from the routing payload.
    pub file_name: String,
    /// Number of chunks fetched.
    pub chunk_count: usize,
    /// Plaintext bytes written.
    pub bytes_written: u64,
}

impl Pipeline {
    /// Downloads from a hex-encoded locator token.
    ///
    /// The token is parsed before any store is contacted.
    pub async fn download_token(
        &self,
        token: &str,
        dest_dir: impl AsRef<Path>,
    ) -> Result<DownloadReport> {
        let locator = Locator::from_hex(token).map_err(Error::MalformedLocator)?;
        self.download_locator(&locator, dest_dir).await
    }

    /// Downloads from the shareable address a locator was published under.
    pub async fn download_shared(
        &self,
        address: &ContentAddress,
        dest_dir: impl AsRef<Path>,
    ) -> Result<DownloadReport> {
        let token = self.content.fetch(address).await?;
        let locator = Locator::unpack(&token).map_err(Error::MalformedLocator)?;
        tracing::debug!(target: TRACING_TARGET, shareable = %address, base = %locator.base(), "Resolved shared locator");
        self.download_locator(&locator, dest_dir).await
    }

    /// Downloads the file a locator points at into `dest_dir`.
    pub async fn download_locator(
        &self,
        locator: &Locator,
        dest_dir: impl AsRef<Path>,
    ) -> Result<DownloadReport> {
        let routing = RoutingPayload::open(&self.keys.routing, locator.payload())
            .map_err(|e| Error::download(locator.base().as_str(), None, e))?;
        self.download_routed(locator.base(), &routing, dest_dir).await
    }

    /// Downloads a file whose routing is already known.
    ///
    /// The output is staged in `.<name>.partial` next to the destination and
    /// renamed over `<dest_dir>/<name>` only once every chunk decrypted. An
    /// existing file of that name is replaced.
    pub async fn download_routed(
        &self,
        base: &ContentAddress,
        routing: &RoutingPayload,
        dest_dir: impl AsRef<Path>,
    ) -> Result<DownloadReport> {
        self.config.validate()?;
        validate_file_name(&routing.file_name)?;
        let prefix = normalize_prefix(&routing.path_prefix);

        tracing::info!(
            target: TRACING_TARGET,
            base = %base,
            bucket = %routing.bucket,
            prefix = %prefix,
            file_name = %routing.file_name,
            "Starting download"
        );

        let bucket = session::open(self.objects.as_ref(), &routing.bucket, false).await?;
        let result = self
            .download_in_session(
                bucket.as_ref(),
                base,
                &prefix,
                &routing.file_name,
                dest_dir.as_ref(),
            )
            .await;
        session::close(bucket.as_ref()).await;

        if let Ok(report) = &result {
            tracing::info!(
                target: TRACING_TARGET,
                path = %report.path.display(),
                chunks = report.chunk_count,
                bytes = report.bytes_written,
                "Download complete"
            );
        }
        result
    }

    async fn download_in_session(
        &self,
        bucket: &dyn BucketHandle,
        base: &ContentAddress,
        prefix: &str,
        file_name: &str,
        dest_dir: &Path,
    ) -> Result<DownloadReport> {
        let manifest_key = Manifest::storage_key(prefix, base);
        let blob = self.get_with_retry(bucket, &manifest_key, None).await?;
        let manifest =
            Manifest::decode(&blob).map_err(|e| Error::download(&manifest_key, None, e))?;
        tracing::debug!(target: TRACING_TARGET, key = %manifest_key, entries = manifest.len(), "Fetched manifest");

        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(file_name);
        let partial = dest_dir.join(format!(".{file_name}.partial"));

        let written = async {
            let written = self.write_chunks(bucket, prefix, base, &manifest, &partial).await?;
            tokio::fs::rename(&partial, &path).await?;
            Ok::<_, Error>(written)
        }
        .await;

        match written {
            Ok(bytes_written) => Ok(DownloadReport {
                path,
                file_name: file_name.to_owned(),
                chunk_count: manifest.len(),
                bytes_written,
            }),
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    tracing::debug!(target: TRACING_TARGET, path = %partial.display(), error = %cleanup, "No partial file to remove");
                }
                Err(e)
            }
        }
    }

    /// Fetches, decrypts and appends every chunk to `partial` in manifest
    /// order. Returns the plaintext bytes written.
    async fn write_chunks(
        &self,
        bucket: &dyn BucketHandle,
        prefix: &str,
        base: &ContentAddress,
        manifest: &Manifest,
        partial: &Path,
    ) -> Result<u64> {
        let mut file = File::create(partial).await?;
        let mut total = 0u64;

        for (index, address) in manifest.entries().iter().enumerate() {
            let key = chunk_key(prefix, base, address);
            let cipher = self.get_with_retry(bucket, &key, Some(index)).await?;
            let plain = decrypt(&self.keys.chunk, &cipher)
                .map_err(|e| Error::download(&key, Some(index), e))?;

            file.write_all(&plain).await?;
            total += plain.len() as u64;

            tracing::trace!(target: TRACING_TARGET, chunk_index = index, size = plain.len(), "Wrote chunk");
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use cairn_core::EncryptionKey;
    use cairn_object::mock::MockProvider;

    use super::*;
    use crate::testing::{BUCKET, Harness, source};
    use crate::{Destination, PipelineConfig, PipelineKeys, UploadReport};

    fn small_chunks() -> PipelineConfig {
        PipelineConfig::default().with_chunk_size(4)
    }

    async fn upload(h: &Harness, data: &[u8], name: &str) -> UploadReport {
        h.pipeline
            .upload(source(data, name), &Destination::new(BUCKET, "files"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn roundtrip_restores_bytes_and_name() {
        let h = Harness::new(MockProvider::new(), small_chunks());
        let report = upload(&h, b"0123456789", "digits.txt").await;
        let out = tempfile::tempdir().unwrap();

        let download = h
            .pipeline
            .download_locator(&report.locator, out.path())
            .await
            .unwrap();

        assert_eq!(download.file_name, "digits.txt");
        assert_eq!(download.path, out.path().join("digits.txt"));
        assert_eq!(download.chunk_count, 3);
        assert_eq!(download.bytes_written, 10);
        assert_eq!(tokio::fs::read(&download.path).await.unwrap(), b"0123456789");
        assert!(!out.path().join(".digits.txt.partial").exists());
        assert_eq!(h.stats.closes(), 2);
    }

    #[tokio::test]
    async fn roundtrip_via_hex_token_and_shared_address() {
        let h = Harness::new(MockProvider::new(), small_chunks());
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 31 % 256) as u8).collect();
        let report = upload(&h, &data, "blob.bin").await;
        let out = tempfile::tempdir().unwrap();

        let by_token = h
            .pipeline
            .download_token(&report.locator.to_hex(), out.path().join("token"))
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&by_token.path).await.unwrap(), data);

        let shared = h.pipeline.publish_locator(&report.locator).await.unwrap();
        let by_share = h
            .pipeline
            .download_shared(&shared, out.path().join("shared"))
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&by_share.path).await.unwrap(), data);
    }

    #[tokio::test]
    async fn malformed_token_makes_no_calls() {
        let h = Harness::new(MockProvider::with_buckets([BUCKET]), small_chunks());
        let out = tempfile::tempdir().unwrap();

        for token in ["not hex", "516d", ""] {
            let err = h.pipeline.download_token(token, out.path()).await.unwrap_err();
            assert!(matches!(err, Error::MalformedLocator(_)), "{token:?}");
        }

        assert_eq!(h.stats.total(), 0);
        assert_eq!(h.content.calls(), 0);
    }

    #[tokio::test]
    async fn wrong_routing_key_fails_before_bucket() {
        let h = Harness::new(MockProvider::new(), small_chunks());
        let report = upload(&h, b"secret", "s.txt").await;
        let opens = h.stats.opens();

        let stranger = h.sibling(
            small_chunks(),
            PipelineKeys::new(h.keys.chunk.clone(), EncryptionKey::generate()),
        );
        let out = tempfile::tempdir().unwrap();
        let err = stranger
            .download_locator(&report.locator, out.path())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::DownloadFailed {
                chunk_index: None,
                ..
            }
        ));
        assert_eq!(h.stats.opens(), opens);
    }

    #[tokio::test]
    async fn wrong_chunk_key_leaves_no_output() {
        let h = Harness::new(MockProvider::new(), small_chunks());
        let report = upload(&h, b"0123456789", "d.txt").await;

        let stranger = h.sibling(
            small_chunks(),
            PipelineKeys::new(EncryptionKey::generate(), h.keys.routing.clone()),
        );
        let out = tempfile::tempdir().unwrap();
        let err = stranger
            .download_locator(&report.locator, out.path())
            .await
            .unwrap_err();

        assert_eq!(err.chunk_index(), Some(0));
        assert!(!out.path().join("d.txt").exists());
        assert!(!out.path().join(".d.txt.partial").exists());
        assert_eq!(h.stats.closes(), 2);
    }

    #[tokio::test]
    async fn missing_bucket_is_not_created_on_download() {
        let h = Harness::new(MockProvider::new(), small_chunks());
        let routing = RoutingPayload::new("absent", "", "f");
        let out = tempfile::tempdir().unwrap();

        let err = h
            .pipeline
            .download_routed(&ContentAddress::digest(b"x"), &routing, out.path())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Session { .. }));
        assert_eq!(h.stats.creates(), 0);
    }

    #[tokio::test]
    async fn existing_file_is_replaced() {
        let h = Harness::new(MockProvider::new(), small_chunks());
        let report = upload(&h, b"short", "f.txt").await;
        let out = tempfile::tempdir().unwrap();
        tokio::fs::write(out.path().join("f.txt"), b"a much longer previous version")
            .await
            .unwrap();

        h.pipeline
            .download_locator(&report.locator, out.path())
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(out.path().join("f.txt")).await.unwrap(), b"short");
    }

    #[tokio::test]
    async fn empty_file_roundtrip() {
        let h = Harness::new(MockProvider::new(), small_chunks());
        let report = upload(&h, b"", "empty").await;
        let out = tempfile::tempdir().unwrap();

        let download = h
            .pipeline
            .download_locator(&report.locator, out.path())
            .await
            .unwrap();

        assert_eq!(download.chunk_count, 0);
        assert!(tokio::fs::read(&download.path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsafe_file_name_is_rejected() {
        let h = Harness::new(MockProvider::with_buckets([BUCKET]), small_chunks());
        let routing = RoutingPayload::new(BUCKET, "", "../escape");
        let out = tempfile::tempdir().unwrap();

        let err = h
            .pipeline
            .download_routed(&ContentAddress::digest(b"x"), &routing, out.path())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidFileName(_)));
        assert_eq!(h.stats.total(), 0);
    }
}
