//! Homefeed - the media and connectivity core of a property-listings client.
//!
//! This crate provides a process-lifetime image preload cache with a
//! throttled background queue, a retry/backoff wrapper for one-shot backend
//! queries, and a connection-health tracker that classifies failures into a
//! Healthy/Degraded/Blocked model.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing orchestration services.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "homefeed";
