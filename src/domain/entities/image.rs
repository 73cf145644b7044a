//! Domain types for image preloading.

use std::sync::Arc;

/// A successfully decoded image held by the cache.
pub type CachedImage = Arc<image::DynamicImage>;

/// Why a URL was skipped without attempting a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty URL string.
    Empty,
    /// Placeholder asset with no network cost worth saving.
    Placeholder,
    /// Inline `data:` URI; already decoded material.
    DataUri,
    /// Another load for the same URL is in flight.
    AlreadyLoading,
}

/// Outcome of a preload attempt.
///
/// Preloading is a best-effort optimization, so failures are values rather
/// than errors; nothing a caller must handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// Fetched, decoded, and inserted into the cache.
    Loaded,
    /// The URL was already cached; no fetch was issued.
    AlreadyCached,
    /// The URL was excluded or already in flight.
    Skipped(SkipReason),
    /// Fetch or decode failed; the URL stays uncached and may be retried.
    Failed,
}

impl PreloadOutcome {
    /// Returns true when the URL is cached after this outcome.
    #[must_use]
    pub const fn is_cached(self) -> bool {
        matches!(self, Self::Loaded | Self::AlreadyCached)
    }
}
