//! Connection health model.
//!
//! A pure record of how recent backend calls have gone, plus the derived
//! Healthy/Degraded/Blocked view the UI layer renders. The "blocked" state is
//! a heuristic for networks that actively drop our traffic (as opposed to
//! ordinary transient failure) and only clears on a success or explicit reset.

use chrono::{DateTime, Utc};

/// Consecutive network-shaped failures tolerated before the connection is
/// considered blocked.
pub const BLOCK_THRESHOLD: u32 = 3;

/// Derived view of the current connection health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Last probe or query succeeded.
    #[default]
    Healthy,
    /// At least one recent failure; ordinary retry advice applies.
    Degraded,
    /// Repeated network-shaped failures; the network appears to drop our
    /// traffic rather than merely being flaky.
    Blocked,
}

/// Record of recent connection outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHealth {
    /// Whether the most recent outcome was a success.
    pub online: bool,
    /// Timestamp of the last successful call, if any.
    pub last_success: Option<DateTime<Utc>>,
    /// Consecutive failures since the last success.
    pub failure_count: u32,
    /// Whether the failure pattern looks like active blocking.
    pub blocked: bool,
}

impl Default for ConnectionHealth {
    fn default() -> Self {
        Self {
            online: true,
            last_success: None,
            failure_count: 0,
            blocked: false,
        }
    }
}

impl ConnectionHealth {
    /// Records a successful call: clears failures and the blocked flag.
    pub fn note_success(&mut self, at: DateTime<Utc>) {
        self.online = true;
        self.last_success = Some(at);
        self.failure_count = 0;
        self.blocked = false;
    }

    /// Records a failed call. `network_shaped` is true for timeouts, aborts,
    /// and transport errors; only those can trip the blocked heuristic.
    pub fn note_failure(&mut self, network_shaped: bool) {
        self.online = false;
        self.failure_count = self.failure_count.saturating_add(1);
        if network_shaped && self.failure_count > BLOCK_THRESHOLD {
            self.blocked = true;
        }
    }

    /// Returns the derived status.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        if self.blocked {
            ConnectionStatus::Blocked
        } else if self.failure_count > 0 {
            ConnectionStatus::Degraded
        } else {
            ConnectionStatus::Healthy
        }
    }
}
