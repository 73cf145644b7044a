//! Image URL classification and hosted-storage optimization.

use crate::domain::entities::SkipReason;

/// Default target width for render-endpoint requests.
pub const DEFAULT_WIDTH: u32 = 800;

/// Default webp quality for render-endpoint requests.
pub const DEFAULT_QUALITY: u32 = 75;

const PUBLIC_OBJECT_PATH: &str = "/storage/v1/object/public/";
const RENDER_IMAGE_PATH: &str = "/storage/v1/render/image/public/";

/// Returns why a URL must not be preloaded, or `None` if it is cacheable.
///
/// Placeholder assets and `data:` URIs carry no network cost, so caching
/// them would only waste memory.
#[must_use]
pub fn exclusion_reason(url: &str) -> Option<SkipReason> {
    if url.is_empty() {
        Some(SkipReason::Empty)
    } else if url.starts_with("data:") {
        Some(SkipReason::DataUri)
    } else if url.contains("placeholder") {
        Some(SkipReason::Placeholder)
    } else {
        None
    }
}

/// Rewrites a hosted-storage public object URL to its image render endpoint
/// with resize parameters. Other URLs are returned unchanged.
#[must_use]
pub fn optimize_storage_url(url: &str, width: u32, quality: u32) -> String {
    if !url.contains(PUBLIC_OBJECT_PATH) {
        return url.to_string();
    }

    let rewritten = url.replace(PUBLIC_OBJECT_PATH, RENDER_IMAGE_PATH);
    let separator = if rewritten.contains('?') { '&' } else { '?' };
    format!("{rewritten}{separator}width={width}&quality={quality}&format=webp")
}

/// Optimizes a URL with default dimensions.
#[must_use]
pub fn optimize_storage_url_default(url: &str) -> String {
    optimize_storage_url(url, DEFAULT_WIDTH, DEFAULT_QUALITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("" => Some(SkipReason::Empty); "empty")]
    #[test_case("data:image/png;base64,iVBORw0KGgo=" => Some(SkipReason::DataUri); "data uri")]
    #[test_case("https://cdn.example/placeholder.svg" => Some(SkipReason::Placeholder); "placeholder")]
    #[test_case("https://cdn.example/listings/12/cover.webp" => None; "ordinary url")]
    fn exclusion(url: &str) -> Option<SkipReason> {
        exclusion_reason(url)
    }

    #[test]
    fn rewrites_public_object_url() {
        let url = "https://abc.supabase.co/storage/v1/object/public/listings/1/cover.jpg";
        let optimized = optimize_storage_url_default(url);

        assert!(optimized.contains("/storage/v1/render/image/public/"));
        assert!(optimized.contains("width=800"));
        assert!(optimized.contains("quality=75"));
        assert!(optimized.contains("format=webp"));
    }

    #[test]
    fn appends_with_ampersand_when_query_exists() {
        let url = "https://abc.supabase.co/storage/v1/object/public/listings/1/cover.jpg?v=3";
        let optimized = optimize_storage_url(url, 400, 60);

        assert!(optimized.contains("?v=3&width=400"));
    }

    #[test]
    fn non_storage_url_unchanged() {
        let url = "https://example.com/image.png";
        assert_eq!(optimize_storage_url_default(url), url);
    }
}
