//! Serializable backend selection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::bucket::ObjectStoreProvider;
use crate::providers::{LocalProvider, MemoryProvider, S3Credentials, S3Provider};

/// Which object store backend to use, as read from configuration files.
///
/// ```json
/// { "kind": "local", "root": "./buckets" }
/// { "kind": "s3", "endpoint": "http://localhost:9000", "accessKeyId": "..." }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ObjectStoreConfig {
    /// Process-local buckets; contents vanish on exit.
    Memory,
    /// Buckets are directories under `root`.
    Local {
        /// Directory holding the buckets.
        root: PathBuf,
    },
    /// S3-compatible service.
    S3(S3Credentials),
}

impl ObjectStoreConfig {
    /// Builds the provider described by this configuration.
    pub fn into_provider(self) -> Box<dyn ObjectStoreProvider> {
        match self {
            Self::Memory => Box::new(MemoryProvider::new()),
            Self::Local { root } => Box::new(LocalProvider::new(root)),
            Self::S3(credentials) => Box::new(S3Provider::new(credentials)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_backends() {
        let local: ObjectStoreConfig =
            serde_json::from_str(r#"{"kind":"local","root":"/tmp/buckets"}"#).unwrap();
        assert_eq!(local.into_provider().id(), "local");

        let s3: ObjectStoreConfig =
            serde_json::from_str(r#"{"kind":"s3","region":"eu-west-1"}"#).unwrap();
        assert!(matches!(&s3, ObjectStoreConfig::S3(c) if c.region == "eu-west-1"));
        assert_eq!(s3.into_provider().id(), "s3");

        let memory: ObjectStoreConfig = serde_json::from_str(r#"{"kind":"memory"}"#).unwrap();
        assert_eq!(memory.into_provider().id(), "memory");
    }
}
