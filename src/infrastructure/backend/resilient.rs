//! Retry with exponential backoff for one-shot backend queries.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::errors::QueryError;

use super::monitor::ConnectionMonitor;

/// Retry configuration for [`resilient_query`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles per attempt.
    pub base_backoff: Duration,
    /// Deadline each individual attempt is raced against.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(15),
        }
    }
}

impl RetryPolicy {
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(1 << attempt.min(16))
    }
}

/// Runs `query` until it succeeds, a terminal error occurs, or retries are
/// exhausted.
///
/// Each attempt is raced against [`RetryPolicy::attempt_timeout`]. Successes
/// and exhausted failures are reported to the monitor; terminal errors (4xx
/// caller mistakes) short-circuit without touching the failure count, since
/// they say nothing about connection health.
///
/// # Errors
/// Returns the terminal error, or the last transient error once retries run
/// out.
pub async fn resilient_query<T, F, Fut>(
    monitor: &ConnectionMonitor,
    policy: RetryPolicy,
    mut query: F,
) -> Result<T, QueryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, QueryError>>,
{
    let mut attempt: u32 = 0;
    loop {
        let result = match tokio::time::timeout(policy.attempt_timeout, query()).await {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout),
        };

        match result {
            Ok(value) => {
                monitor.record_success();
                return Ok(value);
            }
            Err(e) if e.is_terminal() => {
                debug!(error = %e, "Terminal query error, not retrying");
                return Err(e);
            }
            Err(e) => {
                if attempt >= policy.max_retries {
                    warn!(attempts = attempt + 1, error = %e, "Query retries exhausted");
                    monitor.record_failure(&e);
                    return Err(e);
                }

                let delay = policy.backoff_for(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "Query failed, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
