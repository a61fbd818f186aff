//! `cairn download`.

use std::sync::Arc;

use anyhow::Context;
use cairn_content::ContentStore;
use cairn_core::{ContentAddress, RoutingPayload};
use cairn_pipeline::{DownloadReport, Pipeline};

use super::{base_config, content_store, pipeline};
use crate::config::{DownloadArgs, DownloadFile, RoutingFile, load_json};

/// What a download starts from, after command line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Shared(String),
    Locator(String),
    Routed(RoutingFile),
}

fn select_source(args: &DownloadArgs, file: &DownloadFile) -> anyhow::Result<Source> {
    if let Some(hash) = &args.hash {
        return Ok(Source::Shared(hash.clone()));
    }
    if let Some(locator) = &args.locator {
        return Ok(Source::Locator(locator.clone()));
    }

    file.shareable_hash
        .clone()
        .map(Source::Shared)
        .or_else(|| file.locator.clone().map(Source::Locator))
        .or_else(|| file.routing.clone().map(Source::Routed))
        .context(
            "nothing to download: pass --hash or --locator, or set 'shareableHash', 'locator' \
             or 'routing' in the download configuration",
        )
}

/// Rebuilds a mirrored file and prints where it was written.
pub async fn download(args: DownloadArgs, verbose: bool) -> anyhow::Result<()> {
    let file: DownloadFile = load_json(&args.config)?;
    file.validate()?;

    let source = select_source(&args, &file)?;
    let output = args.output.clone().unwrap_or_else(|| file.download_path.clone());
    let keys = args
        .keys
        .resolve(file.chunk_key.as_deref(), file.routing_key.as_deref())?;

    let store: Arc<dyn ContentStore> = content_store(file.ipfs)?;
    let pipeline = pipeline(
        store,
        file.backend,
        base_config(verbose, file.max_attempts),
        keys,
    )?;

    let report = fetch(&pipeline, source, &output).await?;

    println!("Downloaded: {}", report.path.display());
    println!("Chunks: {}", report.chunk_count);
    println!("Bytes: {}", report.bytes_written);

    Ok(())
}

async fn fetch(
    pipeline: &Pipeline,
    source: Source,
    output: &std::path::Path,
) -> anyhow::Result<DownloadReport> {
    match source {
        Source::Shared(hash) => {
            let address = ContentAddress::parse(hash.trim())
                .with_context(|| format!("invalid shareable hash '{hash}'"))?;
            pipeline
                .verify_content_store()
                .await
                .context("content store is not reachable")?;
            pipeline
                .download_shared(&address, output)
                .await
                .with_context(|| format!("failed to download {address}"))
        }
        Source::Locator(token) => pipeline
            .download_token(&token, output)
            .await
            .context("failed to download from locator"),
        Source::Routed(routing) => {
            let base = ContentAddress::parse(routing.base_address.trim())
                .with_context(|| format!("invalid base address '{}'", routing.base_address))?;
            let payload =
                RoutingPayload::new(routing.bucket, &routing.upload_path, routing.file_name);
            pipeline
                .download_routed(&base, &payload, output)
                .await
                .with_context(|| format!("failed to download {base}"))
        }
    }
}
