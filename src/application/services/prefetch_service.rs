//! Listing image prefetch orchestration.

use std::sync::Arc;

use tracing::info;

use crate::domain::entities::Listing;
use crate::domain::errors::QueryError;
use crate::domain::ports::BackendPort;
use crate::infrastructure::backend::{ConnectionMonitor, RetryPolicy, resilient_query};
use crate::infrastructure::image::ImageCacheManager;

/// What a prefetch run accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchReport {
    /// Listings fetched from the backend.
    pub listings: usize,
    /// Image URLs handed to the cache.
    pub images_requested: usize,
    /// URLs cached once the eager tier settled (the background queue keeps
    /// working after the report is produced).
    pub images_cached: usize,
    /// URLs still pending in the background queue.
    pub images_pending: usize,
}

/// Fetches recent listings and warms the image cache with their photos.
pub struct PrefetchService {
    backend: Arc<dyn BackendPort>,
    cache: ImageCacheManager,
    monitor: Arc<ConnectionMonitor>,
    policy: RetryPolicy,
}

impl PrefetchService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        backend: Arc<dyn BackendPort>,
        cache: ImageCacheManager,
        monitor: Arc<ConnectionMonitor>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            cache,
            monitor,
            policy,
        }
    }

    /// Fetches up to `limit` listings resiliently and preloads their images.
    ///
    /// # Errors
    /// Returns error if the listing query fails after retries. Image loads
    /// themselves never fail the run.
    pub async fn warm_listings(&self, limit: u32) -> Result<PrefetchReport, QueryError> {
        let backend = &self.backend;
        let listings =
            resilient_query(&self.monitor, self.policy, || backend.fetch_listings(limit)).await?;

        let urls: Vec<String> = listings
            .iter()
            .flat_map(Listing::image_urls)
            .collect();

        self.cache.preload_batch(&urls).await;

        let images_cached = urls.iter().filter(|u| self.cache.is_cached(u)).count();
        let report = PrefetchReport {
            listings: listings.len(),
            images_requested: urls.len(),
            images_cached,
            images_pending: self.cache.pending_count(),
        };

        info!(
            listings = report.listings,
            requested = report.images_requested,
            cached = report.images_cached,
            pending = report.images_pending,
            "Prefetch run complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::ports::mocks::{MockBackend, MockImageFetcher};
    use crate::infrastructure::image::PreloadConfig;

    fn listing(id: &str, cover: &str, gallery: &[&str]) -> Listing {
        Listing {
            id: id.into(),
            title: format!("Listing {id}"),
            city: None,
            price: None,
            currency: None,
            cover_image_url: Some(cover.into()),
            gallery_urls: gallery.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn service(backend: MockBackend, fetcher: Arc<MockImageFetcher>) -> PrefetchService {
        let cache = ImageCacheManager::new(fetcher, PreloadConfig::default());
        PrefetchService::new(
            Arc::new(backend),
            cache,
            Arc::new(ConnectionMonitor::new()),
            RetryPolicy::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn warms_cover_images_eagerly() {
        let backend = MockBackend::with_listings(vec![
            listing("1", "https://cdn.example/1/cover.webp", &[]),
            listing("2", "https://cdn.example/2/cover.webp", &[]),
            listing(
                "3",
                "https://cdn.example/3/cover.webp",
                &["https://cdn.example/3/a.webp", "https://cdn.example/3/b.webp"],
            ),
        ]);
        let fetcher = Arc::new(MockImageFetcher::new());
        let service = service(backend, fetcher.clone());

        let report = service.warm_listings(10).await.expect("prefetch");

        assert_eq!(report.listings, 3);
        assert_eq!(report.images_requested, 5);
        // The three covers lead the batch and are awaited.
        assert_eq!(report.images_cached, 3);
        assert_eq!(report.images_pending, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_listing_fetch_before_giving_up() {
        let backend = MockBackend::with_listings(vec![listing(
            "1",
            "https://cdn.example/1/cover.webp",
            &[],
        )])
        .failing_first(vec![
            QueryError::network("reset"),
            QueryError::http(503, "unavailable"),
        ]);
        let fetcher = Arc::new(MockImageFetcher::new());
        let service = service(backend, fetcher);

        let report = service.warm_listings(5).await.expect("prefetch");
        assert_eq!(report.listings, 1);
        assert_eq!(report.images_cached, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_backend_error_surfaces_without_retry() {
        let backend = Arc::new(
            MockBackend::with_listings(Vec::new())
                .failing_first(vec![QueryError::http(401, "unauthorized")]),
        );
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = ImageCacheManager::new(fetcher.clone(), PreloadConfig::default());
        let service = PrefetchService::new(
            backend.clone(),
            cache,
            Arc::new(ConnectionMonitor::new()),
            RetryPolicy::default(),
        );

        let result = service.warm_listings(5).await;
        assert!(matches!(result, Err(QueryError::Http { status: 401, .. })));
        assert_eq!(backend.calls(), 1);
        assert_eq!(fetcher.fetch_count(), 0);
    }
}
