//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound every wrapped call with a deadline
//! - Report a deadline miss separately from the call's own failure
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - The losing side of the race is dropped: a timed-out future is cancelled at
//!   its next suspension point and never polled again, and the timer is released
//!   as soon as the call completes

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Outcome of a single deadline-bounded call.
#[derive(Debug)]
pub enum CallOutcome<T, E> {
    Success(T),
    Failed(E),
    TimedOut,
}

impl<T, E> CallOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }
}

/// Race `fut` against `deadline`.
pub async fn run_with_timeout<Fut, T, E>(deadline: Duration, fut: Fut) -> CallOutcome<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    match timeout(deadline, fut).await {
        Ok(Ok(value)) => CallOutcome::Success(value),
        Ok(Err(e)) => CallOutcome::Failed(e),
        Err(_) => CallOutcome::TimedOut,
    }
}
