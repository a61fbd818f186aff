//! `cairn store`.

use anyhow::Context;
use cairn_pipeline::UploadSource;

use super::{base_config, content_store, pipeline};
use crate::config::{ContentFile, StorageFile, StoreArgs, load_json};

/// Mirrors the configured file and prints its shareable hash and locator.
pub async fn store(args: StoreArgs, verbose: bool) -> anyhow::Result<()> {
    let content: ContentFile = load_json(&args.content)?;
    content.validate()?;
    let storage: StorageFile = load_json(&args.storage)?;
    storage.validate()?;

    let keys = args
        .keys
        .resolve(storage.chunk_key.as_deref(), storage.routing_key.as_deref())?;
    let config = base_config(verbose, content.max_attempts)
        .with_chunk_size(content.chunk_size)
        .with_verify(args.verify);

    let store = content_store(content.ipfs)?;
    let pipeline = pipeline(store, storage.backend.clone(), config, keys)?;
    pipeline
        .verify_content_store()
        .await
        .context("content store is not reachable")?;

    let source = UploadSource::open(&content.path)
        .await
        .with_context(|| format!("failed to open {}", content.path.display()))?;
    let report = pipeline
        .upload(source, &storage.destination())
        .await
        .with_context(|| format!("failed to store {}", content.path.display()))?;

    println!("Base Address: {}", report.base_address);
    println!("Chunks: {}", report.chunk_count);

    if !args.no_publish {
        let shareable = pipeline
            .publish_locator(&report.locator)
            .await
            .context("failed to publish locator")?;
        println!("Shareable Hash: {shareable}");
    }
    println!("Locator: {}", report.locator.to_hex());

    Ok(())
}
