//! Convenient re-exports for common use.

pub use crate::address::{AddressHasher, ContentAddress};
pub use crate::chunk::{Chunk, ChunkSlice, ChunkSplitter};
pub use crate::crypto::{EncryptionKey, decrypt, encrypt};
pub use crate::error::{Error, Result};
pub use crate::locator::Locator;
pub use crate::manifest::Manifest;
pub use crate::retry::{RetryError, retry};
pub use crate::routing::RoutingPayload;
