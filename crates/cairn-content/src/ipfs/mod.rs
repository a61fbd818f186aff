//! Kubo (go-ipfs) HTTP RPC client.
//!
//! Every RPC endpoint is a `POST` under `/api/v0/`.

mod client;
mod config;

pub use client::{IpfsClient, TRACING_TARGET};
pub use config::IpfsConfig;
