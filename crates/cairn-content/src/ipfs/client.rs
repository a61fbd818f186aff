//! Reqwest-based client for a Kubo node.

use std::sync::Arc;

use bytes::Bytes;
use cairn_core::ContentAddress;
use futures::channel::mpsc;
use futures::SinkExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use url::Url;

use super::IpfsConfig;
use crate::error::{Error, Result};
use crate::store::ContentStore;

/// Tracing target for IPFS client operations.
pub const TRACING_TARGET: &str = "cairn_content::ipfs";

/// Size of the buffers streamed to the node when hashing a reader.
const STREAM_BUFFER_SIZE: usize = 256 * 1024;

/// Inner client that holds the HTTP client and configuration.
struct IpfsClientInner {
    http: Client,
    base: Url,
    config: IpfsConfig,
}

/// Client for the Kubo HTTP RPC API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct IpfsClient {
    inner: Arc<IpfsClientInner>,
}

impl std::fmt::Debug for IpfsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpfsClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Response of `/api/v0/add`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
    hash: String,
}

/// Response of `/api/v0/version`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VersionResponse {
    version: String,
}

impl IpfsClient {
    /// Creates a client for the node described by `config`.
    pub fn new(config: IpfsConfig) -> Result<Self> {
        let base = config.endpoint_url()?;
        let timeout = config.effective_timeout();

        tracing::debug!(
            target: TRACING_TARGET,
            endpoint = %base,
            timeout_ms = timeout.as_millis(),
            "Creating IPFS client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.effective_user_agent())
            .build()
            .map_err(Error::Request)?;

        let inner = IpfsClientInner { http, base, config };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the node's version string.
    #[tracing::instrument(name = "ipfs.version", skip(self))]
    pub async fn version(&self) -> Result<String> {
        let response = self.call("version", &[]).send().await?;
        let body: VersionResponse = Self::check(response).await?.json().await?;
        Ok(body.version)
    }

    fn endpoint(&self, method: &str) -> Url {
        let mut url = self.inner.base.clone();
        url.set_path(&format!("/api/v0/{method}"));
        url
    }

    fn call(&self, method: &str, query: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.inner.http.post(self.endpoint(method)).query(query)
    }

    /// Posts `body` to `/api/v0/add` and parses the returned address.
    async fn post_add(&self, body: Body, only_hash: bool) -> Result<ContentAddress> {
        let form = Form::new().part("file", Part::stream(body).file_name("blob"));
        let only_hash = if only_hash { "true" } else { "false" };

        let response = self
            .call(
                "add",
                &[("only-hash", only_hash), ("cid-version", "0"), ("pin", "true")],
            )
            .multipart(form)
            .send()
            .await?;

        let body: AddResponse = Self::check(response).await?.json().await?;
        Ok(ContentAddress::parse(&body.hash)?)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(Error::UnexpectedResponse(format!("{status}: {}", text.trim())))
    }
}

#[async_trait::async_trait]
impl ContentStore for IpfsClient {
    #[tracing::instrument(name = "ipfs.address_of", skip_all)]
    async fn address_of(&self, reader: &mut (dyn AsyncRead + Unpin + Send)) -> Result<ContentAddress> {
        // The request body must own its stream, so the borrowed reader is
        // pumped through a bounded channel while the request is in flight.
        let (mut tx, rx) = mpsc::channel::<std::io::Result<Bytes>>(4);

        let pump = async move {
            let mut total = 0u64;
            loop {
                let mut buffer = vec![0u8; STREAM_BUFFER_SIZE];
                let n = reader.read(&mut buffer).await?;
                if n == 0 {
                    break;
                }
                buffer.truncate(n);
                total += n as u64;
                if tx.send(Ok(Bytes::from(buffer))).await.is_err() {
                    break;
                }
            }
            Ok::<_, std::io::Error>(total)
        };

        let request = self.post_add(Body::wrap_stream(rx), true);
        let (pumped, address) = futures::join!(pump, request);

        let total = pumped?;
        let address = address?;
        tracing::debug!(target: TRACING_TARGET, size = total, address = %address, "Computed stream address");
        Ok(address)
    }

    #[tracing::instrument(name = "ipfs.address_of_bytes", skip_all, fields(size = data.len()))]
    async fn address_of_bytes(&self, data: Bytes) -> Result<ContentAddress> {
        self.post_add(Body::from(data), true).await
    }

    #[tracing::instrument(name = "ipfs.add", skip_all, fields(size = data.len()))]
    async fn add(&self, data: Bytes) -> Result<ContentAddress> {
        let address = self.post_add(Body::from(data), false).await?;
        tracing::info!(target: TRACING_TARGET, address = %address, "Published content");
        Ok(address)
    }

    #[tracing::instrument(name = "ipfs.fetch", skip_all, fields(address = %address))]
    async fn fetch(&self, address: &ContentAddress) -> Result<Bytes> {
        let response = self
            .call("cat", &[("arg", address.as_str())])
            .send()
            .await?;
        Ok(Self::check(response).await?.bytes().await?)
    }

    #[tracing::instrument(name = "ipfs.verify", skip(self))]
    async fn verify(&self) -> Result<()> {
        let version = self.version().await?;
        tracing::info!(target: TRACING_TARGET, version = %version, "Content store reachable");
        Ok(())
    }
}
