//! Image fetch port definition.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::QueryError;

/// Port for fetching raw image bytes.
///
/// The cache manager never talks to the network directly; it goes through
/// this port so tests can stub fetches and count them.
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Fetches the encoded image at `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes, QueryError>;
}
