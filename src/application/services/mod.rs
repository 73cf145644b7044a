//! Application services.

mod prefetch_service;

pub use prefetch_service::{PrefetchReport, PrefetchService};
