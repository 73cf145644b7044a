//! Entity definitions.

mod image;
mod listing;

pub use image::{CachedImage, PreloadOutcome, SkipReason};
pub use listing::Listing;
