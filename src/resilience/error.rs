//! Errors surfaced at the breaker boundary.

use thiserror::Error;

/// Outcome of a guarded call that did not succeed.
///
/// `Service` carries the protected operation's own error, untouched.
/// `ShortCircuited` is produced by the breaker itself while it refuses calls;
/// it carries the detail of the last real failure rather than a generic message.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The protected operation ran and failed.
    #[error(transparent)]
    Service(E),

    /// The call was not attempted; the cached failure is stale.
    #[error("{}", .last_failure.as_deref().unwrap_or("circuit open"))]
    ShortCircuited { last_failure: Option<String> },
}

impl<E> BreakerError<E> {
    /// True if the breaker refused the call without invoking the operation.
    pub fn is_short_circuited(&self) -> bool {
        matches!(self, BreakerError::ShortCircuited { .. })
    }

    /// The cached failure detail returned while the circuit is open.
    pub fn stale_response(&self) -> Option<&str> {
        match self {
            BreakerError::ShortCircuited { last_failure } => last_failure.as_deref(),
            BreakerError::Service(_) => None,
        }
    }

    /// The protected operation's error, if it actually ran.
    pub fn into_service_error(self) -> Option<E> {
        match self {
            BreakerError::Service(e) => Some(e),
            BreakerError::ShortCircuited { .. } => None,
        }
    }
}

/// Rejected breaker construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidConfig {
    #[error("failure_threshold must be greater than zero")]
    ZeroFailureThreshold,
}
