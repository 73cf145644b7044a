//! HTTP image fetcher.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::domain::errors::QueryError;
use crate::domain::ports::ImageFetchPort;

use super::urls::optimize_storage_url_default;

const USER_AGENT: &str = concat!("homefeed/", env!("CARGO_PKG_VERSION"));

/// Fetches image bytes over HTTP, rewriting hosted-storage URLs to their
/// resized render endpoint first.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher with the given request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(timeout: std::time::Duration) -> Result<Self, QueryError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetchPort for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, QueryError> {
        let optimized = optimize_storage_url_default(url);
        debug!(url = %optimized, "Fetching image");

        let response = self.client.get(&optimized).send().await.map_err(|e| {
            if e.is_timeout() {
                QueryError::Timeout
            } else {
                QueryError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown"),
            ));
        }

        response
            .bytes()
            .await
            .map_err(|e| QueryError::network(format!("failed to read body: {e}")))
    }
}
