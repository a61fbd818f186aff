#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod download;
mod error;
mod pipeline;
mod session;
mod upload;

#[cfg(test)]
mod testing;

pub use config::{DEFAULT_CHUNK_SIZE, Destination, PipelineConfig, PipelineKeys};
pub use download::{DownloadReport, TRACING_TARGET as TRACING_TARGET_DOWNLOAD};
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use upload::{TRACING_TARGET as TRACING_TARGET_UPLOAD, UploadReport, UploadSource};
