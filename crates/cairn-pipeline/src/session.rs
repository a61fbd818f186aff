//! Bucket session lifecycle.

use cairn_object::{BucketHandle, ObjectStoreProvider};

use crate::error::{Error, Result};

/// Tracing target for bucket sessions.
const TRACING_TARGET: &str = "cairn_pipeline::session";

/// Opens `bucket`, creating it once if it is missing and `create_missing`
/// is set.
pub(crate) async fn open(
    provider: &dyn ObjectStoreProvider,
    bucket: &str,
    create_missing: bool,
) -> Result<Box<dyn BucketHandle>> {
    let session_error = |source: cairn_object::Error| Error::Session {
        bucket: bucket.to_owned(),
        source,
    };

    match provider.open_bucket(bucket).await {
        Ok(handle) => Ok(handle),
        Err(e) if e.is_bucket_not_found() && create_missing => {
            tracing::info!(target: TRACING_TARGET, bucket, backend = provider.id(), "Bucket not found, creating");
            provider.create_bucket(bucket).await.map_err(session_error)?;
            provider.open_bucket(bucket).await.map_err(session_error)
        }
        Err(e) => Err(session_error(e)),
    }
}

/// Closes a session, logging rather than failing on close errors.
pub(crate) async fn close(handle: &dyn BucketHandle) {
    if let Err(e) = handle.close().await {
        tracing::warn!(target: TRACING_TARGET, bucket = handle.name(), error = %e, "Failed to close bucket session");
    }
}
