//! Application layer containing orchestration services.

/// Service definitions.
pub mod services;

pub use services::{PrefetchReport, PrefetchService};
