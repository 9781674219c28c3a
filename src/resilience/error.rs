//! Caller-facing error taxonomy.

use std::time::Duration;
use thiserror::Error;

/// Error returned by a breaker when no fallback absorbed the outcome.
///
/// The three variants keep the wrapped call's own failure, a deadline miss and
/// a fast-fail rejection distinguishable for the caller.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The wrapped call failed on its own.
    #[error("{0}")]
    Inner(E),

    /// The wrapped call did not finish within the call timeout.
    #[error("breaker '{breaker}' timed out after {}ms", .timeout.as_millis())]
    Timeout { breaker: String, timeout: Duration },

    /// The circuit is open and the cooldown has not elapsed.
    #[error("breaker '{breaker}' is open, retry in {}ms", .retry_after.as_millis())]
    Open { breaker: String, retry_after: Duration },
}

impl<E> BreakerError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BreakerError::Timeout { .. })
    }

    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open { .. })
    }

    pub fn inner(&self) -> Option<&E> {
        match self {
            BreakerError::Inner(e) => Some(e),
            _ => None,
        }
    }

    /// Recover the wrapped call's own error, if that is what this is.
    pub fn into_inner(self) -> Option<E> {
        match self {
            BreakerError::Inner(e) => Some(e),
            _ => None,
        }
    }
}
