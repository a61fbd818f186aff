#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for object store operations.
pub const TRACING_TARGET: &str = "cairn_object";

mod bucket;
mod config;
mod error;

pub mod client;
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
/// Bucket providers for the supported backends.
pub mod providers;

#[doc(hidden)]
pub mod prelude;

pub use bucket::{BucketHandle, ObjectStoreProvider};
pub use config::ObjectStoreConfig;
pub use error::{BoxedError, Error, ErrorKind, Result};
