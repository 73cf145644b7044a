//! Property listing entity.

use serde::Deserialize;

/// A property listing row as served by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    /// Row identifier.
    pub id: String,
    /// Listing headline.
    pub title: String,
    /// City the property is located in.
    #[serde(default)]
    pub city: Option<String>,
    /// Asking price in minor units of `currency`.
    #[serde(default)]
    pub price: Option<i64>,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Card/cover image shown in list views.
    #[serde(default)]
    pub cover_image_url: Option<String>,
    /// Remaining gallery images, in display order.
    #[serde(default)]
    pub gallery_urls: Vec<String>,
}

impl Listing {
    /// Returns every image URL in display order: cover first, then gallery.
    #[must_use]
    pub fn image_urls(&self) -> Vec<String> {
        let mut urls = Vec::with_capacity(1 + self.gallery_urls.len());
        if let Some(cover) = &self.cover_image_url {
            urls.push(cover.clone());
        }
        urls.extend(self.gallery_urls.iter().cloned());
        urls
    }
}
