//! JSON configuration files.
//!
//! Field names are camelCase so the files stay readable next to other
//! node tooling:
//!
//! ```json
//! { "ipfs": { "endpoint": "http://127.0.0.1:5001" }, "path": "./report.pdf", "chunkSize": 262144 }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use cairn_content::IpfsConfig;
use cairn_object::ObjectStoreConfig;
use cairn_pipeline::{DEFAULT_CHUNK_SIZE, Destination};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::TRACING_TARGET_CONFIG;

/// Reads and parses a JSON configuration file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;
    let value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse configuration file {}", path.display()))?;

    tracing::debug!(
        target: TRACING_TARGET_CONFIG,
        path = %path.display(),
        "Loaded configuration file"
    );

    Ok(value)
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// `content.json`: where the source file lives and how to address it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFile {
    /// Content store node.
    #[serde(default)]
    pub ipfs: IpfsConfig,
    /// Local file to mirror.
    pub path: PathBuf,
    /// Plaintext bytes per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Attempts per object upload. Unset keeps the pipeline default.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl ContentFile {
    /// Checks the values that cannot be caught by parsing alone.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.path.as_os_str().is_empty() {
            bail!("content configuration: 'path' must name the file to store");
        }
        if self.chunk_size == 0 {
            bail!("content configuration: 'chunkSize' must be positive");
        }
        if self.max_attempts == Some(0) {
            bail!("content configuration: 'maxAttempts' must be at least 1");
        }
        Ok(())
    }
}

/// `storage.json`: which bucket receives the ciphertext and the keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageFile {
    /// Object store backend and credentials.
    pub backend: ObjectStoreConfig,
    /// Destination bucket.
    pub bucket: String,
    /// Key prefix inside the bucket.
    #[serde(default)]
    pub upload_path: String,
    /// Key sealing chunk contents.
    #[serde(default)]
    pub chunk_key: Option<String>,
    /// Key sealing routing payloads.
    #[serde(default)]
    pub routing_key: Option<String>,
}

impl StorageFile {
    /// Checks the values that cannot be caught by parsing alone.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bucket.trim().is_empty() {
            bail!("storage configuration: 'bucket' must not be empty");
        }
        Ok(())
    }

    /// Bucket and normalized prefix uploads land in.
    pub fn destination(&self) -> Destination {
        Destination::new(self.bucket.clone(), &self.upload_path)
    }
}

/// Explicit routing for downloads that bypass the locator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingFile {
    /// Base address the objects were stored under.
    pub base_address: String,
    /// Bucket holding the objects.
    pub bucket: String,
    /// Key prefix inside the bucket.
    #[serde(default)]
    pub upload_path: String,
    /// Name to write the reconstructed file under.
    pub file_name: String,
}

/// `download.json`: what to fetch and where to write it.
///
/// Exactly one of `shareableHash`, `locator` and `routing` selects the
/// source; command line overrides take precedence over all three.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadFile {
    /// Content store node, used to resolve shareable hashes.
    #[serde(default)]
    pub ipfs: IpfsConfig,
    /// Object store backend and credentials.
    pub backend: ObjectStoreConfig,
    /// Address the locator was published under.
    #[serde(default)]
    pub shareable_hash: Option<String>,
    /// Hex locator token.
    #[serde(default)]
    pub locator: Option<String>,
    /// Explicit routing.
    #[serde(default)]
    pub routing: Option<RoutingFile>,
    /// Directory the file is written into.
    #[serde(default = "default_download_path")]
    pub download_path: PathBuf,
    /// Key sealing chunk contents.
    #[serde(default)]
    pub chunk_key: Option<String>,
    /// Key sealing routing payloads.
    #[serde(default)]
    pub routing_key: Option<String>,
    /// Attempts per object fetch. Unset keeps the pipeline default.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_download_path() -> PathBuf {
    PathBuf::from(".")
}

impl DownloadFile {
    /// Checks that at most one source is configured.
    pub fn validate(&self) -> anyhow::Result<()> {
        let sources = [
            self.shareable_hash.is_some(),
            self.locator.is_some(),
            self.routing.is_some(),
        ];
        if sources.into_iter().filter(|set| *set).count() > 1 {
            bail!(
                "download configuration: set only one of 'shareableHash', 'locator' and 'routing'"
            );
        }
        if self.max_attempts == Some(0) {
            bail!("download configuration: 'maxAttempts' must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_defaults() {
        let file: ContentFile = serde_json::from_str(r#"{ "path": "./report.pdf" }"#).unwrap();
        assert_eq!(file.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(file.ipfs.endpoint, "http://127.0.0.1:5001");
        assert!(file.validate().is_ok());

        let file: ContentFile =
            serde_json::from_str(r#"{ "path": "a", "chunkSize": 0 }"#).unwrap();
        assert!(file.validate().is_err());
    }

    #[test]
    fn storage_destination_is_normalized() {
        let file: StorageFile = serde_json::from_str(
            r#"{
                "backend": { "kind": "local", "root": "./buckets" },
                "bucket": "mirror",
                "uploadPath": "files",
                "chunkKey": "0123456789abcdef0123456789abcdef"
            }"#,
        )
        .unwrap();

        assert!(file.validate().is_ok());
        assert!(matches!(file.backend, ObjectStoreConfig::Local { .. }));
        assert_eq!(file.destination().path_prefix(), "files/");
        assert!(file.routing_key.is_none());
    }

    #[test]
    fn storage_rejects_blank_bucket() {
        let file: StorageFile =
            serde_json::from_str(r#"{ "backend": { "kind": "memory" }, "bucket": " " }"#).unwrap();
        assert!(file.validate().is_err());
    }

    #[test]
    fn download_sources_are_exclusive() {
        let file: DownloadFile = serde_json::from_str(
            r#"{
                "backend": { "kind": "memory" },
                "shareableHash": "QmX",
                "routing": {
                    "baseAddress": "QmY",
                    "bucket": "mirror",
                    "fileName": "a.txt"
                }
            }"#,
        )
        .unwrap();
        assert!(file.validate().is_err());

        let file: DownloadFile =
            serde_json::from_str(r#"{ "backend": { "kind": "memory" }, "locator": "00" }"#)
                .unwrap();
        assert!(file.validate().is_ok());
        assert_eq!(file.download_path, PathBuf::from("."));
    }

    #[test]
    fn load_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_json::<StorageFile>(&path).unwrap_err();
        assert!(format!("{err:#}").contains("storage.json"));

        let missing = load_json::<StorageFile>(&dir.path().join("absent.json")).unwrap_err();
        assert!(missing.to_string().contains("absent.json"));
    }
}
