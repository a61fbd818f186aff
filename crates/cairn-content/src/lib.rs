//! Content-addressed store clients for cairn.
//!
//! # Example
//!
//! ```rust,ignore
//! use cairn_content::{ContentStore, IpfsClient, IpfsConfig};
//!
//! let client = IpfsClient::new(IpfsConfig::default())?;
//! client.verify().await?;
//!
//! let address = client.add(Bytes::from_static(b"hello")).await?;
//! let data = client.fetch(&address).await?;
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod ipfs;
mod memory;
mod store;

pub use crate::error::{Error, Result};
pub use crate::ipfs::{IpfsClient, IpfsConfig, TRACING_TARGET};
pub use crate::memory::MemoryContentStore;
pub use crate::store::ContentStore;
