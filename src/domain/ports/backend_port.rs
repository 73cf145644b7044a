//! Backend data port definition.

use async_trait::async_trait;

use crate::domain::entities::Listing;
use crate::domain::errors::QueryError;

/// Port for reading listing data from the hosted backend.
#[async_trait]
pub trait BackendPort: Send + Sync {
    /// Fetches up to `limit` listings ordered by recency.
    async fn fetch_listings(&self, limit: u32) -> Result<Vec<Listing>, QueryError>;

    /// Minimal read-only probe used for connection health checks.
    async fn probe(&self) -> Result<(), QueryError>;
}
