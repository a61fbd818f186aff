//! Object store providers.

mod local;
mod memory;
mod s3;

pub use local::LocalProvider;
pub use memory::MemoryProvider;
pub use s3::{S3Credentials, S3Provider};
