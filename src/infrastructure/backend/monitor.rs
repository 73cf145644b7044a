//! Connection health monitor.

use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::domain::connection::{ConnectionHealth, ConnectionStatus};
use crate::domain::errors::QueryError;
use crate::domain::ports::BackendPort;

/// Abort timeout for the read-only probe query.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracks backend connection health across queries and probes.
///
/// Owned by the caller and shared by handle; tests construct independent
/// monitors. The resilient query wrapper feeds it outcomes, the status
/// banner reads it.
#[derive(Debug, Default)]
pub struct ConnectionMonitor {
    health: Mutex<ConnectionHealth>,
}

impl ConnectionMonitor {
    /// Creates a monitor in the healthy default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful backend call.
    pub fn record_success(&self) {
        self.health.lock().note_success(Utc::now());
    }

    /// Records a failed backend call.
    pub fn record_failure(&self, error: &QueryError) {
        let mut health = self.health.lock();
        health.note_failure(error.is_network_shaped());
        if health.blocked {
            warn!(
                failures = health.failure_count,
                "Connection looks blocked, not merely flaky"
            );
        } else {
            debug!(failures = health.failure_count, error = %error, "Connection failure recorded");
        }
    }

    /// Issues a minimal read-only probe and folds the outcome into the
    /// health record. Returns the resulting status.
    pub async fn check_connection(&self, backend: &dyn BackendPort) -> ConnectionStatus {
        match tokio::time::timeout(PROBE_TIMEOUT, backend.probe()).await {
            Ok(Ok(())) => self.record_success(),
            Ok(Err(e)) => self.record_failure(&e),
            Err(_) => self.record_failure(&QueryError::Timeout),
        }
        self.status()
    }

    /// Restores the healthy defaults. Backs the user-facing "Retry" action.
    pub fn reset(&self) {
        *self.health.lock() = ConnectionHealth::default();
        info!("Connection state reset");
    }

    /// Returns the derived status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.health.lock().status()
    }

    /// Returns a copy of the current health record.
    #[must_use]
    pub fn snapshot(&self) -> ConnectionHealth {
        self.health.lock().clone()
    }
}
