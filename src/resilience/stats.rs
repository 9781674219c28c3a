//! Breaker state and point-in-time statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// State of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation - calls pass through
    Closed,
    /// Dependency is failing - calls fail fast until the cooldown elapses
    Open,
    /// Probing - calls pass through and decide whether to close or re-open
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }

    /// Gauge encoding: 0 closed, 1 half-open, 2 open.
    pub fn as_gauge(&self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::HalfOpen => 1.0,
            CircuitState::Open => 2.0,
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of a breaker, for dashboards and the admin API.
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerStats {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub probe_successes: u32,
    pub last_failure_at: Option<u64>,
    pub last_success_at: Option<u64>,
    pub total_requests: u64,
    pub total_failures: u64,
    pub total_successes: u64,
    /// Calls fast-failed while open.
    pub total_rejections: u64,
    /// Transitions into `Open`.
    pub total_trips: u64,
}

impl BreakerStats {
    /// Every request ends as exactly one of success, failure or rejection.
    pub fn is_balanced(&self) -> bool {
        self.total_requests == self.total_successes + self.total_failures + self.total_rejections
    }
}

/// Wall-clock milliseconds since the Unix epoch.
pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
