#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for core codec operations.
pub const TRACING_TARGET: &str = "cairn_core";

mod error;

pub mod address;
pub mod chunk;
pub mod crypto;
pub mod locator;
pub mod manifest;
pub mod retry;
pub mod routing;

#[doc(hidden)]
pub mod prelude;

pub use address::{ADDRESS_LEN, ADDRESS_PREFIX, AddressHasher, ContentAddress};
pub use chunk::{Chunk, ChunkSlice, ChunkSplitter, chunk_count, chunk_key};
pub use crypto::EncryptionKey;
pub use error::{BoxedError, Error, Result};
pub use locator::Locator;
pub use manifest::Manifest;
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryError, retry};
pub use routing::{RoutingPayload, normalize_prefix};
