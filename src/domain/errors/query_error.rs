//! Backend query error types.

use thiserror::Error;

/// Typed taxonomy of backend query failures.
///
/// Produced by the HTTP layer so that retry and connection-health decisions
/// key off variants instead of error-message text.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum QueryError {
    #[error("query timed out")]
    Timeout,

    #[error("query was aborted")]
    Aborted,

    #[error("network error: {message}")]
    Network { message: String },

    #[error("backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("failed to decode backend response: {message}")]
    Decode { message: String },
}

impl QueryError {
    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an HTTP status error.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns true for caller mistakes that retrying cannot fix.
    ///
    /// Any 4xx counts except 408 (request timeout) and 429 (rate limit),
    /// which behave like transient conditions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Http { status, .. }
            if *status >= 400 && *status < 500 && *status != 408 && *status != 429)
    }

    /// Returns true when the failure looks like a transport-level problem
    /// rather than a backend response. Only these can trip the blocked
    /// connection heuristic.
    #[must_use]
    pub const fn is_network_shaped(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Aborted | Self::Network { .. }
        )
    }
}
