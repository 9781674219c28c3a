//! Trip record emitted when a breaker opens.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::resilience::stats::unix_millis;

/// Structured record of a transition into `Open`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub id: Uuid,
    pub breaker_name: String,
    /// Consecutive failures observed when the circuit opened.
    pub consecutive_failures: u32,
    /// Configured failure threshold.
    pub threshold: u32,
    /// Message of the failure that opened the circuit.
    pub last_error: String,
    pub cooldown_ms: u64,
    /// Lifetime trip count of this breaker, including this one.
    pub trips: u64,
    /// Milliseconds since the Unix epoch.
    pub occurred_at: u64,
}

impl DiagnosticRecord {
    pub fn new(
        breaker_name: &str,
        consecutive_failures: u32,
        threshold: u32,
        last_error: String,
        cooldown: Duration,
        trips: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            breaker_name: breaker_name.to_string(),
            consecutive_failures,
            threshold,
            last_error,
            cooldown_ms: cooldown.as_millis() as u64,
            trips,
            occurred_at: unix_millis(),
        }
    }
}
