//! Object store error types.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with the object store [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of object store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The bucket does not exist. Upload creates it once and reopens.
    BucketNotFound,
    /// Network or service hiccup; the operation may succeed if repeated.
    Transient,
    /// Credentials were rejected or lack the required scope.
    PermissionDenied,
    /// The requested object does not exist.
    NotFound,
    /// The backend is misconfigured or does not support the operation.
    Configuration,
    /// Anything else.
    Other,
}

/// A structured object store error.
#[derive(Debug, Error)]
#[error("{}: {message}", kind.as_ref())]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new bucket-not-found error.
    pub fn bucket_not_found(bucket: &str) -> Self {
        Self::new(
            ErrorKind::BucketNotFound,
            format!("bucket '{bucket}' does not exist"),
        )
    }

    /// Creates a new transient error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    /// Creates a new permission denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Creates a new not found error.
    pub fn not_found(key: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("object '{key}' does not exist"))
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether repeating the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::Transient
    }

    /// Whether the error reports a missing bucket.
    pub fn is_bucket_not_found(&self) -> bool {
        self.kind == ErrorKind::BucketNotFound
    }
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Self {
        let kind = match &err {
            object_store::Error::NotFound { .. } => ErrorKind::NotFound,
            object_store::Error::PermissionDenied { .. }
            | object_store::Error::Unauthenticated { .. } => ErrorKind::PermissionDenied,
            object_store::Error::NotSupported { .. }
            | object_store::Error::NotImplemented
            | object_store::Error::UnknownConfigurationKey { .. }
            | object_store::Error::InvalidPath { .. } => ErrorKind::Configuration,
            object_store::Error::AlreadyExists { .. }
            | object_store::Error::Precondition { .. }
            | object_store::Error::NotModified { .. } => ErrorKind::Other,
            object_store::Error::Generic { store, source } => classify_generic(store, &**source),
            _ => ErrorKind::Transient,
        };
        Self::new(kind, err.to_string()).with_source(err)
    }
}

/// Store name `object_store` reports for the local filesystem backend.
const LOCAL_STORE: &str = "LocalFileSystem";

/// Classifies a backend-specific error by the first I/O error in its source
/// chain. Local filesystem errors without one are not retried.
fn classify_generic(store: &str, source: &(dyn std::error::Error + 'static)) -> ErrorKind {
    let mut current = Some(source);
    while let Some(err) = current {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            return classify_io(io.kind());
        }
        current = err.source();
    }

    if store == LOCAL_STORE {
        ErrorKind::Other
    } else {
        ErrorKind::Transient
    }
}

fn classify_io(kind: std::io::ErrorKind) -> ErrorKind {
    use std::io::ErrorKind as Io;

    match kind {
        Io::PermissionDenied => ErrorKind::PermissionDenied,
        Io::NotFound => ErrorKind::NotFound,
        Io::TimedOut
        | Io::Interrupted
        | Io::WouldBlock
        | Io::ConnectionReset
        | Io::ConnectionAborted
        | Io::ConnectionRefused
        | Io::BrokenPipe
        | Io::UnexpectedEof => ErrorKind::Transient,
        _ => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_is_retryable() {
        assert!(Error::transient("timeout").is_retryable());
        assert!(!Error::permission_denied("nope").is_retryable());
        assert!(!Error::bucket_not_found("b").is_retryable());
        assert!(!Error::not_found("k").is_retryable());
    }

    #[test]
    fn display_includes_kind() {
        let err = Error::bucket_not_found("photos");
        assert_eq!(err.to_string(), "bucket_not_found: bucket 'photos' does not exist");
        assert_eq!(err.kind_str(), "bucket_not_found");
    }

    #[test]
    fn maps_object_store_errors() {
        let err: Error = object_store::Error::NotFound {
            path: "a/b".into(),
            source: "missing".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: Error = object_store::Error::PermissionDenied {
            path: "a/b".into(),
            source: "denied".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let err: Error = object_store::Error::Generic {
            store: "S3",
            source: "connection reset".into(),
        }
        .into();
        assert!(err.is_retryable());
    }

    #[derive(Debug, thiserror::Error)]
    #[error("unable to create file")]
    struct CreateFailed(#[source] std::io::Error);

    #[test]
    fn local_filesystem_failures_are_fatal() {
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err: Error = object_store::Error::Generic {
            store: LOCAL_STORE,
            source: Box::new(CreateFailed(denied)),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(!err.is_retryable());

        let full = std::io::Error::from(std::io::ErrorKind::StorageFull);
        let err: Error = object_store::Error::Generic {
            store: LOCAL_STORE,
            source: Box::new(full),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Other);

        let err: Error = object_store::Error::Generic {
            store: LOCAL_STORE,
            source: "bad metadata".into(),
        }
        .into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn interrupted_io_is_retryable() {
        let reset = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
        let err: Error = object_store::Error::Generic {
            store: "S3",
            source: Box::new(CreateFailed(reset)),
        }
        .into();
        assert!(err.is_retryable());
    }
}
