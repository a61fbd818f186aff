//! Convenience re-exports.

pub use crate::bucket::{BucketHandle, ObjectStoreProvider};
pub use crate::client::ObjectStoreClient;
pub use crate::config::ObjectStoreConfig;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::providers::{LocalProvider, MemoryProvider, S3Credentials, S3Provider};
