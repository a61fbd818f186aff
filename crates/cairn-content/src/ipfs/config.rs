//! Configuration for the IPFS client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default RPC endpoint of a local Kubo node.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5001";

/// Default timeout for RPC requests: 60 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`IpfsClient`](super::IpfsClient).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpfsConfig {
    /// Base URL of the node's RPC API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds. Zero selects the default.
    #[serde(default)]
    pub timeout_secs: u64,
    /// User-Agent header sent with requests.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: 0,
            user_agent: None,
        }
    }
}

impl IpfsConfig {
    /// Creates a configuration pointing at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Parses the endpoint into an absolute HTTP(S) URL.
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("'{}': {e}", self.endpoint)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::InvalidEndpoint(format!(
                "'{}': unsupported scheme '{scheme}'",
                self.endpoint
            ))),
        }
    }

    /// Returns the effective timeout, using the default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            DEFAULT_TIMEOUT
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }

    /// Returns the effective user agent.
    pub fn effective_user_agent(&self) -> String {
        match &self.user_agent {
            Some(agent) if !agent.is_empty() => agent.clone(),
            _ => format!("cairn/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
