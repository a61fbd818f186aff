//! Upload: split, encrypt, address and store a source stream.

use std::path::Path;

use bytes::Bytes;
use cairn_core::crypto::{decrypt, encrypt};
use cairn_core::{
    Chunk, ChunkSplitter, ContentAddress, Locator, Manifest, RoutingPayload, chunk_count,
};
use cairn_object::BucketHandle;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt};

use crate::config::{Destination, validate_file_name};
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::session;

/// Tracing target for upload runs.
pub const TRACING_TARGET: &str = "cairn_pipeline::upload";

/// A seekable source stream with its declared size and file name.
///
/// The stream is read twice: once to compute the base address, once to
/// split it into chunks.
#[derive(Debug)]
pub struct UploadSource<R> {
    reader: R,
    size: u64,
    file_name: String,
}

impl<R> UploadSource<R>
where
    R: AsyncRead + AsyncSeek + Unpin + Send,
{
    /// Wraps a reader whose length is `size` bytes.
    pub fn new(reader: R, size: u64, file_name: impl Into<String>) -> Self {
        Self {
            reader,
            size,
            file_name: file_name.into(),
        }
    }

    /// Declared size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Name recorded in the routing payload.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl UploadSource<File> {
    /// Opens a local file, taking its size from metadata and its name from
    /// the last path component.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidFileName(path.display().to_string()))?
            .to_owned();

        let file = File::open(path).await?;
        let size = file.metadata().await?.len();
        Ok(Self::new(file, size, file_name))
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadReport {
    /// Token that locates, authenticates and names the upload.
    pub locator: Locator,
    /// Address of the unencrypted source; the namespace of every object key.
    pub base_address: ContentAddress,
    /// Chunk addresses in index order.
    pub manifest: Manifest,
    /// Number of chunks stored.
    pub chunk_count: usize,
    /// Ciphertext bytes stored, excluding the manifest.
    pub bytes_uploaded: u64,
}

impl Pipeline {
    /// Mirrors `source` into `destination` and returns its locator.
    ///
    /// Nothing is returned unless every chunk and the manifest were stored.
    /// The bucket is created once if it does not exist, and the session is
    /// closed on every exit path.
    ///
    /// Uploading the same file again is not idempotent at the object level.
    /// Each chunk is sealed under a fresh nonce, so it lands under a new key
    /// and the chunks of the previous upload are left in place, unreferenced.
    /// Only the manifest, keyed by the base address, is overwritten.
    pub async fn upload<R>(
        &self,
        source: UploadSource<R>,
        destination: &Destination,
    ) -> Result<UploadReport>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send,
    {
        self.config.validate()?;
        validate_file_name(&source.file_name)?;
        let expected_chunks = chunk_count(source.size, self.config.chunk_size)?;

        tracing::info!(
            target: TRACING_TARGET,
            file_name = %source.file_name,
            size = source.size,
            bucket = destination.bucket(),
            prefix = destination.path_prefix(),
            chunk_size = self.config.chunk_size,
            chunks = expected_chunks,
            "Starting upload"
        );

        let bucket = session::open(self.objects.as_ref(), destination.bucket(), true).await?;
        let result = self
            .upload_in_session(bucket.as_ref(), source, destination, expected_chunks)
            .await;
        session::close(bucket.as_ref()).await;

        if let Ok(report) = &result {
            tracing::info!(
                target: TRACING_TARGET,
                base = %report.base_address,
                chunks = report.chunk_count,
                bytes = report.bytes_uploaded,
                "Upload complete"
            );
        }
        result
    }

    async fn upload_in_session<R>(
        &self,
        bucket: &dyn BucketHandle,
        mut source: UploadSource<R>,
        destination: &Destination,
        expected_chunks: u64,
    ) -> Result<UploadReport>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send,
    {
        let prefix = destination.path_prefix();

        let base = self.content.address_of(&mut source.reader).await?;
        source.reader.rewind().await?;
        tracing::debug!(target: TRACING_TARGET, base = %base, "Computed base address");

        let mut splitter = ChunkSplitter::new(&mut source.reader, self.config.chunk_size)?;
        let mut manifest = Manifest::new();
        let mut bytes_uploaded = 0u64;

        while let Some(slice) = splitter.next_chunk().await? {
            let cipher = encrypt(&self.keys.chunk, &slice.data).map_err(cairn_core::Error::from)?;
            let cipher = Bytes::from(cipher);
            let address = self.content.address_of_bytes(cipher.clone()).await?;
            let chunk = Chunk::new(slice.index, slice.data, cipher, address);

            let key = chunk.storage_key(prefix, &base);
            self.put_with_retry(bucket, &key, chunk.cipher.clone(), Some(chunk.index))
                .await?;

            if self.config.verbose {
                tracing::info!(
                    target: TRACING_TARGET,
                    chunk_index = chunk.index,
                    total = expected_chunks,
                    key = %key,
                    size = chunk.raw.len(),
                    "Stored chunk"
                );
            }

            bytes_uploaded += chunk.cipher.len() as u64;
            manifest.push(chunk.address);
        }

        let read = splitter.bytes_read();
        if read != source.size {
            return Err(Error::SizeMismatch {
                expected: source.size,
                actual: read,
            });
        }

        let manifest_key = Manifest::storage_key(prefix, &base);
        let blob = Bytes::from(manifest.encode());
        self.put_with_retry(bucket, &manifest_key, blob, None).await?;
        tracing::debug!(
            target: TRACING_TARGET,
            key = %manifest_key,
            entries = manifest.len(),
            "Stored manifest"
        );

        if self.config.readback() {
            self.read_back(bucket, prefix, &base, &manifest, source.size)
                .await?;
        }

        let routing = RoutingPayload::new(destination.bucket(), prefix, &source.file_name);
        let locator = Locator::pack(base.clone(), routing.seal(&self.keys.routing)?);

        Ok(UploadReport {
            locator,
            base_address: base,
            chunk_count: manifest.len(),
            manifest,
            bytes_uploaded,
        })
    }

    /// Re-reads the manifest and every chunk, checking they decrypt to
    /// `expected_size` bytes in the recorded order.
    async fn read_back(
        &self,
        bucket: &dyn BucketHandle,
        prefix: &str,
        base: &ContentAddress,
        manifest: &Manifest,
        expected_size: u64,
    ) -> Result<()> {
        let manifest_key = Manifest::storage_key(prefix, base);
        let blob = self.get_with_retry(bucket, &manifest_key, None).await?;
        let stored = Manifest::decode(&blob)?;
        if &stored != manifest {
            return Err(Error::VerificationFailed(format!(
                "manifest '{manifest_key}' does not match the uploaded chunk list"
            )));
        }

        let mut total = 0u64;
        for (index, address) in stored.entries().iter().enumerate() {
            let key = cairn_core::chunk_key(prefix, base, address);
            let cipher = self.get_with_retry(bucket, &key, Some(index)).await?;
            let plain = decrypt(&self.keys.chunk, &cipher).map_err(|e| {
                Error::VerificationFailed(format!("chunk {index} at '{key}' does not decrypt: {e}"))
            })?;
            total += plain.len() as u64;
        }

        if total != expected_size {
            return Err(Error::VerificationFailed(format!(
                "read back {total} bytes, expected {expected_size}"
            )));
        }

        tracing::info!(
            target: TRACING_TARGET,
            chunks = stored.len(),
            bytes = total,
            "Verified upload"
        );
        Ok(())
    }
}
