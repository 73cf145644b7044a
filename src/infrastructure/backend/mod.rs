//! Hosted backend access.
//!
//! This module provides:
//! - A REST client for the hosted listings database
//! - Retry with exponential backoff for one-shot queries
//! - A connection-health monitor with a Blocked heuristic

pub mod client;
pub mod monitor;
pub mod resilient;

pub use client::RestBackendClient;
pub use monitor::{ConnectionMonitor, PROBE_TIMEOUT};
pub use resilient::{RetryPolicy, resilient_query};
