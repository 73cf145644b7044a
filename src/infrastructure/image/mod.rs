//! Image handling infrastructure.
//!
//! This module provides:
//! - A process-lifetime preload cache keyed by URL
//! - A throttled background preload queue
//! - HTTP fetching with hosted-storage URL optimization

pub mod cache;
pub mod fetcher;
pub mod urls;

pub use cache::{CacheStats, ImageCacheManager, PreloadConfig};
pub use fetcher::HttpImageFetcher;
pub use urls::{exclusion_reason, optimize_storage_url, optimize_storage_url_default};
