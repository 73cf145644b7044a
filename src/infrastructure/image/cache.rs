//! In-memory image preload cache.
//!
//! Process-lifetime cache of decoded images keyed by URL. Listing views hand
//! it a batch of URLs: the first few are loaded eagerly (above the fold), the
//! rest drain through a background queue in small throttled batches so
//! prefetching never competes with interactive work.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::domain::entities::{CachedImage, PreloadOutcome, SkipReason};
use crate::domain::ports::ImageFetchPort;

use super::urls::exclusion_reason;

/// Preload policy knobs.
#[derive(Debug, Clone, Copy)]
pub struct PreloadConfig {
    /// Leading URLs of a batch awaited before `preload_batch` returns.
    pub eager_count: usize,
    /// Maximum concurrent loads per background batch.
    pub batch_size: usize,
    /// Pause between background batches.
    pub batch_pause: Duration,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            eager_count: 3,
            batch_size: 4,
            batch_pause: Duration::from_millis(50),
        }
    }
}

/// Shared state behind the cache handle.
struct CacheState {
    entries: RwLock<HashMap<String, CachedImage>>,
    loading: Mutex<HashSet<String>>,
    queue: Mutex<VecDeque<String>>,
    draining: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
    fetcher: Arc<dyn ImageFetchPort>,
    config: PreloadConfig,
}

/// URL-keyed cache of decoded images with a throttled preload queue.
///
/// Entries are inserted only on a successful fetch and decode and are never
/// evicted; `clear` is the only way to drop them. Failed loads stay uncached
/// so a later preload can retry. Cloning yields another handle to the same
/// cache.
#[derive(Clone)]
pub struct ImageCacheManager {
    state: Arc<CacheState>,
}

impl std::fmt::Debug for ImageCacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCacheManager")
            .field("config", &self.state.config)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl ImageCacheManager {
    /// Creates a cache manager around the given fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ImageFetchPort>, config: PreloadConfig) -> Self {
        Self {
            state: Arc::new(CacheState {
                entries: RwLock::new(HashMap::new()),
                loading: Mutex::new(HashSet::new()),
                queue: Mutex::new(VecDeque::new()),
                draining: AtomicBool::new(false),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                fetcher,
                config,
            }),
        }
    }

    /// Preloads a single URL.
    ///
    /// Best-effort: failures come back as [`PreloadOutcome::Failed`], never
    /// as an error, and leave no cache entry behind.
    pub async fn preload(&self, url: &str) -> PreloadOutcome {
        self.state.preload(url).await
    }

    /// Preloads a batch of URLs in display order.
    ///
    /// The first [`PreloadConfig::eager_count`] eligible URLs are awaited
    /// before this returns; every other eligible URL is queued for the
    /// background drain.
    pub async fn preload_batch(&self, urls: &[String]) {
        let state = &self.state;

        let mut eligible = Vec::with_capacity(urls.len());
        let mut seen = HashSet::new();
        for url in urls {
            if exclusion_reason(url).is_some() || self.is_cached(url) || self.is_loading(url) {
                continue;
            }
            if seen.insert(url.as_str()) {
                eligible.push(url.clone());
            }
        }

        if eligible.is_empty() {
            return;
        }

        let eager_count = state.config.eager_count.min(eligible.len());
        let deferred = eligible.split_off(eager_count);

        debug!(
            eager = eligible.len(),
            deferred = deferred.len(),
            "Preloading listing images"
        );

        join_all(eligible.iter().map(|url| state.preload(url))).await;

        if !deferred.is_empty() {
            {
                let mut queue = state.queue.lock();
                for url in deferred {
                    if !queue.contains(&url) {
                        queue.push_back(url);
                    }
                }
            }
            CacheState::spawn_drain(state);
        }
    }

    /// Returns true if `url` has a cached decoded image.
    #[must_use]
    pub fn is_cached(&self, url: &str) -> bool {
        self.state.entries.read().contains_key(url)
    }

    /// Returns the cached image for `url`, counting a hit or miss.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<CachedImage> {
        let entries = self.state.entries.read();
        if let Some(img) = entries.get(url) {
            self.state.hits.fetch_add(1, Ordering::Relaxed);
            trace!(url, "Image cache hit");
            Some(img.clone())
        } else {
            self.state.misses.fetch_add(1, Ordering::Relaxed);
            trace!(url, "Image cache miss");
            None
        }
    }

    /// Returns true if a load for `url` is in flight.
    #[must_use]
    pub fn is_loading(&self, url: &str) -> bool {
        self.state.loading.lock().contains(url)
    }

    /// Number of URLs waiting in the background queue.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.queue.lock().len()
    }

    /// Number of loads currently in flight.
    ///
    /// The queue empties when a batch is popped, not when its loads settle;
    /// anyone waiting for quiescence must watch this too.
    #[must_use]
    pub fn loading_count(&self) -> usize {
        self.state.loading.lock().len()
    }

    /// Number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.entries.read().len()
    }

    /// Returns true if the cache holds no images.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the cache, the loading set, and the pending queue.
    ///
    /// Cache-reset tooling only; not part of normal operation.
    pub fn clear(&self) {
        self.state.entries.write().clear();
        self.state.loading.lock().clear();
        self.state.queue.lock().clear();
        debug!("Cleared image cache");
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.state.hits.load(Ordering::Relaxed);
        let misses = self.state.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }
}

impl CacheState {
    async fn preload(&self, url: &str) -> PreloadOutcome {
        if let Some(reason) = exclusion_reason(url) {
            trace!(url, ?reason, "Skipping preload");
            return PreloadOutcome::Skipped(reason);
        }

        if self.entries.read().contains_key(url) {
            return PreloadOutcome::AlreadyCached;
        }

        {
            let mut loading = self.loading.lock();
            if !loading.insert(url.to_string()) {
                return PreloadOutcome::Skipped(SkipReason::AlreadyLoading);
            }
        }

        let outcome = self.load(url).await;

        // The loading mark comes off no matter how the load settled.
        self.loading.lock().remove(url);

        outcome
    }

    async fn load(&self, url: &str) -> PreloadOutcome {
        let bytes = match self.fetcher.fetch(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(url, error = %e, "Image fetch failed; leaving uncached");
                return PreloadOutcome::Failed;
            }
        };

        let decoded =
            match tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await {
                Ok(Ok(img)) => img,
                Ok(Err(e)) => {
                    warn!(url, error = %e, "Image decode failed");
                    return PreloadOutcome::Failed;
                }
                Err(e) => {
                    warn!(url, error = %e, "Image decode task panicked");
                    return PreloadOutcome::Failed;
                }
            };

        self.entries
            .write()
            .insert(url.to_string(), Arc::new(decoded));
        trace!(url, "Image cached");

        PreloadOutcome::Loaded
    }

    /// Spawns the background drain unless one is already running.
    fn spawn_drain(state: &Arc<Self>) {
        if state
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let state = Arc::clone(state);
        tokio::spawn(Self::drain(state));
    }

    async fn drain(state: Arc<Self>) {
        loop {
            let batch: Vec<String> = {
                let mut queue = state.queue.lock();
                let take = state.config.batch_size.min(queue.len());
                queue.drain(..take).collect()
            };

            if batch.is_empty() {
                break;
            }

            join_all(batch.iter().map(|url| state.preload(url))).await;
            tokio::time::sleep(state.config.batch_pause).await;
        }

        state.draining.store(false, Ordering::SeqCst);

        // A URL enqueued between the last pop and the flag reset would
        // otherwise sit until the next preload_batch call.
        if !state.queue.lock().is_empty() {
            Self::spawn_drain(&state);
        }
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockImageFetcher;

    fn manager(fetcher: Arc<MockImageFetcher>) -> ImageCacheManager {
        ImageCacheManager::new(fetcher, PreloadConfig::default())
    }

    /// Yields until `cond` holds, without letting the paused clock advance.
    async fn settle_until(cond: impl Fn() -> bool) {
        while !cond() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn preload_caches_and_second_call_skips_fetch() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = manager(fetcher.clone());
        let url = "https://cdn.example/a.png";

        assert_eq!(cache.preload(url).await, PreloadOutcome::Loaded);
        assert!(cache.is_cached(url));

        assert_eq!(cache.preload(url).await, PreloadOutcome::AlreadyCached);
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn excluded_urls_never_enter_cache_or_loading_set() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = manager(fetcher.clone());

        for url in ["", "data:image/png;base64,AAAA", "https://x/placeholder.png"] {
            let outcome = cache.preload(url).await;
            assert!(matches!(outcome, PreloadOutcome::Skipped(_)), "{url}");
            assert!(!cache.is_cached(url));
            assert!(!cache.is_loading(url));
        }
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn failed_load_stays_uncached_and_can_retry() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = manager(fetcher.clone());
        let url = "https://cdn.example/flaky.png";

        fetcher.fail_for(url);
        assert_eq!(cache.preload(url).await, PreloadOutcome::Failed);
        assert!(!cache.is_cached(url));
        assert!(!cache.is_loading(url));

        fetcher.heal(url);
        assert_eq!(cache.preload(url).await, PreloadOutcome::Loaded);
        assert!(cache.is_cached(url));
    }

    #[tokio::test(start_paused = true)]
    async fn batch_loads_eager_tier_and_queues_the_rest() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = manager(fetcher.clone());
        let urls: Vec<String> = (0..10)
            .map(|i| format!("https://cdn.example/{i}.png"))
            .collect();

        cache.preload_batch(&urls).await;

        // The first three were awaited; the rest sit in the queue until the
        // background drain gets scheduled.
        for url in &urls[..3] {
            assert!(cache.is_cached(url), "{url}");
        }
        assert_eq!(cache.pending_count(), 7);

        tokio::time::sleep(Duration::from_secs(1)).await;

        for url in &urls {
            assert!(cache.is_cached(url), "{url}");
        }
        assert_eq!(cache.pending_count(), 0);
        assert_eq!(fetcher.fetch_count(), 10);
        assert!(fetcher.peak_in_flight() <= 4);
        // The eager tier went out first, in display order.
        assert_eq!(fetcher.fetched_urls()[..3], urls[..3]);
    }

    #[tokio::test(start_paused = true)]
    async fn background_batches_are_gated_on_the_pause() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = manager(fetcher.clone());
        let urls: Vec<String> = (0..12)
            .map(|i| format!("https://cdn.example/{i}.png"))
            .collect();

        cache.preload_batch(&urls).await;
        assert_eq!(fetcher.fetch_count(), 3);

        // The first background batch goes out as soon as the drain runs.
        settle_until(|| cache.len() == 7).await;
        assert_eq!(fetcher.fetch_count(), 7);
        assert_eq!(cache.pending_count(), 5);

        // The second batch waits for batch_pause, not merely for the first
        // batch to finish; yielding alone must not let it start.
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        assert_eq!(fetcher.fetch_count(), 7);

        tokio::time::sleep(Duration::from_millis(50)).await;
        settle_until(|| cache.len() == 11).await;
        assert_eq!(fetcher.fetch_count(), 11);

        tokio::time::sleep(Duration::from_millis(50)).await;
        settle_until(|| cache.len() == 12).await;
        assert_eq!(cache.pending_count(), 0);
        assert_eq!(cache.loading_count(), 0);
    }

    #[tokio::test]
    async fn loading_count_tracks_in_flight_loads() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = manager(fetcher);

        let handle = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.preload("https://cdn.example/slow.png").await })
        };

        // One yield lets the spawned load reach its first await point.
        tokio::task::yield_now().await;
        assert_eq!(cache.loading_count(), 1);

        let outcome = handle.await.expect("preload task");
        assert_eq!(outcome, PreloadOutcome::Loaded);
        assert_eq!(cache.loading_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_batches_never_double_fetch() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = manager(fetcher.clone());
        let urls: Vec<String> = (0..12)
            .map(|i| format!("https://cdn.example/{i}.png"))
            .collect();

        cache.preload_batch(&urls).await;
        cache.preload_batch(&urls).await;
        cache.preload_batch(&urls).await;

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(cache.len(), 12);
        assert_eq!(fetcher.fetch_count(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_skips_excluded_and_cached_urls() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = manager(fetcher.clone());

        cache.preload("https://cdn.example/known.png").await;

        let urls = vec![
            "https://cdn.example/known.png".to_string(),
            String::new(),
            "data:image/gif;base64,R0lGOD".to_string(),
            "https://cdn.example/new.png".to_string(),
        ];
        cache.preload_batch(&urls).await;

        tokio::time::sleep(Duration::from_millis(200)).await;

        // Only the genuinely new URL costs a fetch.
        assert_eq!(fetcher.fetch_count(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn clear_empties_everything() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = manager(fetcher);
        let url = "https://cdn.example/a.png";

        cache.preload(url).await;
        assert!(cache.is_cached(url));

        cache.clear();
        assert!(!cache.is_cached(url));
        assert!(cache.is_empty());
        assert_eq!(cache.pending_count(), 0);
    }

    #[tokio::test]
    async fn get_tracks_hits_and_misses() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let cache = manager(fetcher);
        let url = "https://cdn.example/a.png";

        cache.preload(url).await;
        assert!(cache.get(url).is_some());
        assert!(cache.get("https://cdn.example/missing.png").is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }
}
