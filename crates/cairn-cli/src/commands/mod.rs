//! Command handlers.
//!
//! Each handler loads its configuration files, wires the stores into a
//! [`Pipeline`] and prints the results a user needs on stdout. Progress goes
//! to the log on stderr.

mod download;
mod probe;
mod store;

use std::sync::Arc;

use anyhow::Context;
use cairn_content::{ContentStore, IpfsClient, IpfsConfig};
use cairn_object::ObjectStoreConfig;
use cairn_pipeline::{Pipeline, PipelineConfig, PipelineKeys};
pub use download::download;
pub use probe::probe;
pub use store::store;

/// Connects to the IPFS node described by `config`.
fn content_store(config: IpfsConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    let endpoint = config.endpoint.clone();
    let client = IpfsClient::new(config)
        .with_context(|| format!("failed to create content store client for {endpoint}"))?;
    Ok(Arc::new(client))
}

/// Builds a pipeline over `content` and the backend in `objects`.
fn pipeline(
    content: Arc<dyn ContentStore>,
    objects: ObjectStoreConfig,
    config: PipelineConfig,
    keys: PipelineKeys,
) -> anyhow::Result<Pipeline> {
    config
        .validate()
        .context("invalid pipeline configuration")?;
    Ok(Pipeline::new(
        content,
        Arc::from(objects.into_provider()),
        config,
        keys,
    ))
}

/// Applies an optional attempt bound on top of the defaults.
fn base_config(verbose: bool, max_attempts: Option<u32>) -> PipelineConfig {
    let config = PipelineConfig::default().with_verbose(verbose);
    match max_attempts {
        Some(max_attempts) => config.with_max_attempts(max_attempts),
        None => config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_config_keeps_default_attempts() {
        let config = base_config(false, None);
        assert_eq!(config.max_attempts, PipelineConfig::default().max_attempts);
        assert!(!config.readback());

        let config = base_config(true, Some(2));
        assert_eq!(config.max_attempts, 2);
        assert!(config.readback());
    }

    #[test]
    fn content_store_rejects_bad_endpoint() {
        let err = content_store(IpfsConfig::new("ftp://node")).err().unwrap();
        assert!(format!("{err:#}").contains("ftp://node"));
    }
}
