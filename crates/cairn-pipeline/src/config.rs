//! Run configuration.

use cairn_core::{DEFAULT_MAX_ATTEMPTS, EncryptionKey, normalize_prefix};

use crate::error::{Error, Result};

/// Default chunk size: 256 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Tunables for one pipeline run, passed by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Plaintext bytes per chunk.
    pub chunk_size: usize,
    /// Attempts per object upload, including the first.
    pub max_attempts: u32,
    /// Log per-chunk progress and read every upload back.
    pub verbose: bool,
    /// Read every upload back and check it decrypts to the source size.
    pub verify: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            verbose: false,
            verify: false,
        }
    }
}

impl PipelineConfig {
    /// Sets the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the per-object attempt bound.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Enables verbose progress.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enables post-upload verification.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Whether uploads are read back after the manifest is written.
    pub fn readback(&self) -> bool {
        self.verify || self.verbose
    }

    /// Checks every setting is in range.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::invalid_configuration("chunk size must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(Error::invalid_configuration(
                "max attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

/// The two secrets a run needs.
///
/// The chunk key seals file contents; the routing key seals the routing
/// payload inside locators. Neither is an object store credential.
#[derive(Debug, Clone)]
pub struct PipelineKeys {
    /// Key for chunk ciphertexts.
    pub chunk: EncryptionKey,
    /// Key for routing payloads.
    pub routing: EncryptionKey,
}

impl PipelineKeys {
    /// Bundles the chunk and routing keys.
    pub fn new(chunk: EncryptionKey, routing: EncryptionKey) -> Self {
        Self { chunk, routing }
    }
}

/// Bucket and key prefix an upload lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    bucket: String,
    path_prefix: String,
}

impl Destination {
    /// Creates a destination, normalizing the prefix to end in `/`.
    pub fn new(bucket: impl Into<String>, path_prefix: impl AsRef<str>) -> Self {
        Self {
            bucket: bucket.into(),
            path_prefix: normalize_prefix(path_prefix.as_ref()),
        }
    }

    /// Bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Normalized key prefix; empty or ending in `/`.
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }
}

/// Accepts only plain file names: no separators, not `.` or `..`.
pub(crate) fn validate_file_name(name: &str) -> Result<()> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if plain {
        Ok(())
    } else {
        Err(Error::InvalidFileName(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert!(config.validate().is_ok());
        assert!(!config.readback());
    }

    #[test]
    fn rejects_zero_settings() {
        let config = PipelineConfig::default().with_chunk_size(0);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));

        let config = PipelineConfig::default().with_max_attempts(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn verbose_implies_readback() {
        assert!(PipelineConfig::default().with_verbose(true).readback());
        assert!(PipelineConfig::default().with_verify(true).readback());
    }

    #[test]
    fn destination_normalizes_prefix() {
        let dest = Destination::new("bucket", "uploads");
        assert_eq!(dest.path_prefix(), "uploads/");
        assert_eq!(Destination::new("bucket", "").path_prefix(), "");
    }

    #[test]
    fn file_names_must_be_plain() {
        assert!(validate_file_name("report.pdf").is_ok());
        for bad in ["", ".", "..", "a/b", r"a\b", "../etc/passwd"] {
            assert!(validate_file_name(bad).is_err(), "{bad:?}");
        }
    }
}
