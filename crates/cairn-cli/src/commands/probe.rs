//! `cairn test`.

use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use cairn_content::MemoryContentStore;
use cairn_core::EncryptionKey;
use cairn_pipeline::PipelineKeys;
use serde::Serialize;

use super::{base_config, pipeline};
use crate::config::{StorageFile, TestArgs, load_json};

/// Sample object body written by the probe.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Sample {
    tool: &'static str,
    version: &'static str,
    pid: u32,
}

impl Sample {
    fn current() -> Self {
        Self {
            tool: "cairn",
            version: env!("CARGO_PKG_VERSION"),
            pid: std::process::id(),
        }
    }

    fn to_bytes(&self) -> anyhow::Result<Bytes> {
        let body = serde_json::to_vec(self).context("failed to encode sample object")?;
        Ok(Bytes::from(body))
    }
}

/// Uploads a small sample object to check the configured bucket accepts
/// writes.
pub async fn probe(args: TestArgs, verbose: bool) -> anyhow::Result<()> {
    let storage: StorageFile = load_json(&args.storage)?;
    storage.validate()?;

    // The probe stores plaintext and never reaches the content store.
    let keys = PipelineKeys::new(EncryptionKey::generate(), EncryptionKey::generate());
    let pipeline = pipeline(
        Arc::new(MemoryContentStore::new()),
        storage.backend.clone(),
        base_config(verbose, None),
        keys,
    )?;

    let destination = storage.destination();
    let key = pipeline
        .probe(&destination, Sample::current().to_bytes()?)
        .await
        .with_context(|| format!("bucket '{}' did not accept the sample object", destination.bucket()))?;

    println!("Uploaded: {}/{key}", destination.bucket());
    Ok(())
}
