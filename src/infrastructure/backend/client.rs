//! Hosted backend REST client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};

use crate::domain::entities::Listing;
use crate::domain::errors::QueryError;
use crate::domain::ports::BackendPort;

const USER_AGENT: &str = concat!("homefeed/", env!("CARGO_PKG_VERSION"));
const LISTINGS_TABLE: &str = "listings";

/// REST client for the hosted listings database.
///
/// Speaks the `/rest/v1/<table>` dialect: the API key goes in both the
/// `apikey` header and a bearer `Authorization` header.
pub struct RestBackendClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestBackendClient {
    /// Creates a new client.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, QueryError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::network(format!("failed to create HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response, QueryError> {
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Backend request failed to send");
                if e.is_timeout() {
                    QueryError::Timeout
                } else if e.is_connect() {
                    QueryError::network("failed to connect to backend")
                } else {
                    QueryError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(Self::status_error(status))
        }
    }

    fn status_error(status: StatusCode) -> QueryError {
        QueryError::http(
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown"),
        )
    }
}

#[async_trait]
impl BackendPort for RestBackendClient {
    async fn fetch_listings(&self, limit: u32) -> Result<Vec<Listing>, QueryError> {
        let url = self.table_url(LISTINGS_TABLE);
        debug!(limit, "Fetching listings");

        let response = self
            .get(
                &url,
                &[
                    ("select", "*".to_string()),
                    ("order", "created_at.desc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let listings: Vec<Listing> = response
            .json()
            .await
            .map_err(|e| QueryError::decode(format!("failed to parse listings: {e}")))?;

        debug!(count = listings.len(), "Listings fetched");
        Ok(listings)
    }

    async fn probe(&self) -> Result<(), QueryError> {
        let url = self.table_url(LISTINGS_TABLE);

        self.get(
            &url,
            &[("select", "id".to_string()), ("limit", "1".to_string())],
        )
        .await?;

        Ok(())
    }
}
