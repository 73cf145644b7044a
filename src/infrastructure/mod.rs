//! Infrastructure layer with external service adapters.

/// Hosted backend access (REST client, retries, connection health).
pub mod backend;
/// Application configuration.
pub mod config;
/// Image handling (caching, preloading, storage URL optimization).
pub mod image;

pub use backend::{ConnectionMonitor, PROBE_TIMEOUT, RestBackendClient, RetryPolicy, resilient_query};
pub use config::{AppConfig, CliArgs, LogLevel, PrefetchSettings, RetrySettings};
pub use image::{
    CacheStats, HttpImageFetcher, ImageCacheManager, PreloadConfig, exclusion_reason,
    optimize_storage_url, optimize_storage_url_default,
};
