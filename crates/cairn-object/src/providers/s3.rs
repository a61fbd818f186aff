//! S3-compatible provider using [`object_store::aws::AmazonS3Builder`].
//!
//! Works with AWS S3, MinIO, and any S3-compatible gateway. Buckets are
//! provisioned out of band; [`S3Provider::create_bucket`] always fails.

use object_store::aws::AmazonS3Builder;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET;
use crate::bucket::{BucketHandle, ObjectStoreProvider, StoreBucket};
use crate::client::ObjectStoreClient;
use crate::error::{Error, Result};

/// Typed credentials for an S3-compatible account.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Credentials {
    /// Region (defaults to `us-east-1`).
    #[serde(default = "default_region")]
    pub region: String,
    /// Endpoint URL (e.g. `http://localhost:9000` for MinIO).
    /// Required for non-AWS services.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key ID for static credentials.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key for static credentials.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Session token for temporary credentials.
    #[serde(default)]
    pub session_token: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

/// Opens buckets on an S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3Provider {
    credentials: S3Credentials,
}

impl S3Provider {
    /// Identifier used in logs and configuration.
    pub const ID: &str = "s3";

    /// Creates a provider for the given account.
    pub fn new(credentials: S3Credentials) -> Self {
        Self { credentials }
    }

    fn builder(&self, bucket: &str) -> AmazonS3Builder {
        let creds = &self.credentials;
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&creds.region);

        if let Some(endpoint) = &creds.endpoint {
            builder = builder.with_endpoint(endpoint);
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        if let Some(access_key) = &creds.access_key_id {
            builder = builder.with_access_key_id(access_key);
        }

        if let Some(secret_key) = &creds.secret_access_key {
            builder = builder.with_secret_access_key(secret_key);
        }

        if let Some(token) = &creds.session_token {
            builder = builder.with_token(token);
        }

        builder
    }
}

#[async_trait::async_trait]
impl ObjectStoreProvider for S3Provider {
    fn id(&self) -> &'static str {
        Self::ID
    }

    async fn open_bucket(&self, name: &str) -> Result<Box<dyn BucketHandle>> {
        let store = self.builder(name).build().map_err(|e| {
            Error::configuration(format!("cannot configure bucket '{name}'")).with_source(e)
        })?;

        let client = ObjectStoreClient::new(store);
        client.verify_reachable().await?;

        tracing::debug!(target: TRACING_TARGET, bucket = name, "Opened S3 bucket");
        Ok(Box::new(StoreBucket::new(name, client)))
    }

    async fn create_bucket(&self, name: &str) -> Result<()> {
        Err(Error::configuration(format!(
            "bucket '{name}' cannot be created through the S3 provider; provision it first"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn credentials_defaults() {
        let creds: S3Credentials = serde_json::from_str(r#"{"accessKeyId":"AK"}"#).unwrap();
        assert_eq!(creds.region, "us-east-1");
        assert_eq!(creds.access_key_id.as_deref(), Some("AK"));
        assert!(creds.endpoint.is_none());
    }

    #[test]
    fn debug_hides_secrets() {
        let creds: S3Credentials =
            serde_json::from_str(r#"{"secretAccessKey":"hunter2"}"#).unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn create_bucket_is_unsupported() {
        let creds: S3Credentials = serde_json::from_str("{}").unwrap();
        let err = S3Provider::new(creds).create_bucket("b").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!err.is_retryable());
    }
}
