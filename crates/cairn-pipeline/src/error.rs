//! Pipeline error types.

use thiserror::Error;

/// Type alias for Results with the pipeline [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by upload and download runs.
#[derive(Debug, Error)]
pub enum Error {
    /// A pipeline setting is out of range. Raised before any network call.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The bucket could not be opened or created.
    #[error("cannot open bucket '{bucket}': {source}")]
    Session {
        bucket: String,
        #[source]
        source: cairn_object::Error,
    },

    /// The content store failed.
    #[error("content store error: {0}")]
    ContentStore(#[from] cairn_content::Error),

    /// An object could not be stored within the retry bound.
    #[error("failed to upload '{key}' after {attempts} attempt(s): {source}")]
    UploadFailed {
        key: String,
        chunk_index: Option<usize>,
        attempts: u32,
        #[source]
        source: cairn_object::Error,
    },

    /// The source produced a different number of bytes than declared.
    #[error("source size mismatch: declared {expected} bytes, read {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    /// The post-upload readback did not match what was written.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// An object could not be fetched or decrypted.
    #[error("failed to download '{key}': {source}")]
    DownloadFailed {
        key: String,
        chunk_index: Option<usize>,
        #[source]
        source: cairn_core::BoxedError,
    },

    /// The locator token could not be unpacked.
    #[error("malformed locator: {0}")]
    MalformedLocator(#[source] cairn_core::Error),

    /// The file name is not a plain file name.
    #[error("invalid file name '{0}'")]
    InvalidFileName(String),

    /// A core codec failed.
    #[error(transparent)]
    Core(#[from] cairn_core::Error),

    /// Local file access failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new download error.
    pub(crate) fn download(
        key: impl Into<String>,
        chunk_index: Option<usize>,
        source: impl Into<cairn_core::BoxedError>,
    ) -> Self {
        Self::DownloadFailed {
            key: key.into(),
            chunk_index,
            source: source.into(),
        }
    }

    /// Chunk index the error refers to, if any.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            Self::UploadFailed { chunk_index, .. } | Self::DownloadFailed { chunk_index, .. } => {
                *chunk_index
            }
            _ => None,
        }
    }
}
