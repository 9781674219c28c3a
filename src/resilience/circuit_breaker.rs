//! Circuit breaker for unreliable external dependencies.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: probing whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures reaches failure_threshold
//! Open → Half-Open: first call after the cooldown elapsed (probes in the same call)
//! Half-Open → Closed: probe_successes reaches success_threshold
//! Half-Open → Open: any probe fails or times out
//! ```
//!
//! # Design Decisions
//! - One breaker per named dependency, shared by every caller of it
//! - Bookkeeping is serialized behind one mutex; the wrapped call runs outside it
//! - Strictly consecutive accounting: any success while Closed zeroes the streak
//! - Fail fast in Open state (no waiting for timeout)
//! - Tripping emits a diagnostic record through a non-blocking handle

use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::diagnostics::{DiagnosticRecord, DiagnosticsHandle};
use crate::observability::metrics;
use crate::resilience::error::BreakerError;
use crate::resilience::stats::{unix_millis, BreakerStats, CircuitState};
use crate::resilience::timeouts::{run_with_timeout, CallOutcome};

const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_SUCCESS_THRESHOLD: u32 = 2;

/// Immutable breaker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures while closed before the circuit opens.
    pub failure_threshold: u32,
    /// Minimum time spent open before a probe is allowed.
    pub cooldown: Duration,
    /// Deadline for each wrapped call.
    pub call_timeout: Duration,
    /// Consecutive probe successes while half-open before the circuit closes.
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            cooldown: DEFAULT_COOLDOWN,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
        }
    }
}

impl BreakerConfig {
    /// Thresholds below 1 are raised to 1.
    pub fn new(failure_threshold: u32, cooldown: Duration, call_timeout: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            call_timeout,
            ..Default::default()
        }
    }

    pub fn with_success_threshold(mut self, success_threshold: u32) -> Self {
        self.success_threshold = success_threshold.max(1);
        self
    }

    pub(crate) fn clamped(mut self) -> Self {
        self.failure_threshold = self.failure_threshold.max(1);
        self.success_threshold = self.success_threshold.max(1);
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Mutable bookkeeping, only touched while holding the breaker's lock.
#[derive(Debug)]
struct BreakerCore {
    state: CircuitState,
    consecutive_failures: u32,
    probe_successes: u32,
    opened_at: Option<Instant>,
    last_failure_at: Option<u64>,
    last_success_at: Option<u64>,
    total_requests: u64,
    total_failures: u64,
    total_successes: u64,
    total_rejections: u64,
    total_trips: u64,
}

impl Default for BreakerCore {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            probe_successes: 0,
            opened_at: None,
            last_failure_at: None,
            last_success_at: None,
            total_requests: 0,
            total_failures: 0,
            total_successes: 0,
            total_rejections: 0,
            total_trips: 0,
        }
    }
}

/// A named guard around calls to one external dependency.
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    core: Mutex<BreakerCore>,
    diagnostics: Option<DiagnosticsHandle>,
}

impl CircuitBreaker {
    /// Zero thresholds in `config` are raised to 1.
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config: config.clamped(),
            core: Mutex::new(BreakerCore::default()),
            diagnostics: None,
        }
    }

    /// Route trip records to a diagnostics dispatcher.
    pub fn with_diagnostics(mut self, handle: DiagnosticsHandle) -> Self {
        self.diagnostics = Some(handle);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn state(&self) -> CircuitState {
        self.core.lock().state
    }

    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    /// Run `work` through the breaker, substituting `fallback` for any error.
    ///
    /// With `Some(fallback)` this never returns `Err`. With `None` the wrapped
    /// call's error, a timeout or an open-circuit rejection is propagated.
    pub async fn execute<F, Fut, T, E>(
        &self,
        work: F,
        fallback: Option<T>,
    ) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        match self.call(work).await {
            Ok(value) => Ok(value),
            Err(e) => match fallback {
                Some(value) => {
                    tracing::debug!(breaker = %self.name, error = %e, "Serving fallback");
                    Ok(value)
                }
                None => Err(e),
            },
        }
    }

    /// Run `work` through the breaker, returning `fallback` on any error.
    pub async fn execute_or<F, Fut, T, E>(&self, work: F, fallback: T) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        match self.call(work).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(breaker = %self.name, error = %e, "Serving fallback");
                fallback
            }
        }
    }

    /// Run `work` through the breaker without a fallback.
    pub async fn call<F, Fut, T, E>(&self, work: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        if let Err(retry_after) = self.admit() {
            metrics::record_rejection(&self.name);
            return Err(BreakerError::Open {
                breaker: self.name.clone(),
                retry_after,
            });
        }

        let started = Instant::now();
        let outcome = run_with_timeout(self.config.call_timeout, work()).await;
        let elapsed = started.elapsed();

        match outcome {
            CallOutcome::Success(value) => {
                metrics::record_call(&self.name, "success", elapsed);
                self.on_success();
                Ok(value)
            }
            CallOutcome::Failed(e) => {
                metrics::record_call(&self.name, "failure", elapsed);
                self.on_failure(&e);
                Err(BreakerError::Inner(e))
            }
            CallOutcome::TimedOut => {
                metrics::record_call(&self.name, "timeout", elapsed);
                let timeout = self.config.call_timeout;
                let reason = format!("timed out after {}ms", timeout.as_millis());
                self.on_failure(&reason);
                Err(BreakerError::Timeout {
                    breaker: self.name.clone(),
                    timeout,
                })
            }
        }
    }

    /// Count the request and decide whether it may run.
    ///
    /// Returns the remaining cooldown when the call must fail fast.
    fn admit(&self) -> Result<(), Duration> {
        let mut core = self.core.lock();
        core.total_requests += 1;

        if core.state != CircuitState::Open {
            return Ok(());
        }

        let elapsed = core
            .opened_at
            .map(|opened_at| opened_at.elapsed())
            .unwrap_or(self.config.cooldown);

        if elapsed >= self.config.cooldown {
            core.state = CircuitState::HalfOpen;
            core.probe_successes = 0;
            tracing::info!(
                breaker = %self.name,
                open_for_ms = elapsed.as_millis() as u64,
                "Circuit breaker half-open - probing dependency"
            );
            metrics::record_transition(&self.name, CircuitState::HalfOpen);
            return Ok(());
        }

        core.total_rejections += 1;
        let remaining = self.config.cooldown - elapsed;
        tracing::debug!(
            breaker = %self.name,
            retry_after_ms = remaining.as_millis() as u64,
            "Circuit open - failing fast"
        );
        Err(remaining)
    }

    fn on_success(&self) {
        let mut core = self.core.lock();
        core.total_successes += 1;
        core.last_success_at = Some(unix_millis());

        match core.state {
            CircuitState::Closed => {
                core.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                core.probe_successes += 1;
                if core.probe_successes >= self.config.success_threshold {
                    core.state = CircuitState::Closed;
                    core.consecutive_failures = 0;
                    core.probe_successes = 0;
                    core.opened_at = None;
                    tracing::info!(
                        breaker = %self.name,
                        "Circuit breaker closing - dependency recovered"
                    );
                    metrics::record_transition(&self.name, CircuitState::Closed);
                }
            }
            // A call admitted before a concurrent trip; lifetime counters only.
            CircuitState::Open => {}
        }
    }

    fn on_failure(&self, error: &dyn fmt::Display) {
        let record = {
            let mut core = self.core.lock();
            core.total_failures += 1;
            core.last_failure_at = Some(unix_millis());

            match core.state {
                CircuitState::Closed => {
                    core.consecutive_failures += 1;
                    if core.consecutive_failures >= self.config.failure_threshold {
                        tracing::warn!(
                            breaker = %self.name,
                            failures = core.consecutive_failures,
                            error = %error,
                            "Circuit breaker opening - too many failures"
                        );
                        Some(self.trip(&mut core, error))
                    } else {
                        None
                    }
                }
                CircuitState::HalfOpen => {
                    tracing::warn!(
                        breaker = %self.name,
                        error = %error,
                        "Circuit breaker re-opening - probe failed"
                    );
                    Some(self.trip(&mut core, error))
                }
                CircuitState::Open => None,
            }
        };

        if let (Some(record), Some(diagnostics)) = (record, &self.diagnostics) {
            diagnostics.dispatch(record);
        }
    }

    fn trip(&self, core: &mut BreakerCore, error: &dyn fmt::Display) -> DiagnosticRecord {
        core.state = CircuitState::Open;
        core.probe_successes = 0;
        core.opened_at = Some(Instant::now());
        core.total_trips += 1;
        metrics::record_transition(&self.name, CircuitState::Open);

        DiagnosticRecord::new(
            &self.name,
            core.consecutive_failures,
            self.config.failure_threshold,
            error.to_string(),
            self.config.cooldown,
            core.total_trips,
        )
    }

    /// Force the breaker closed and clear the transient counters.
    ///
    /// Lifetime counters are left untouched.
    pub fn reset(&self) {
        let mut core = self.core.lock();
        let previous_state = core.state;
        core.state = CircuitState::Closed;
        core.consecutive_failures = 0;
        core.probe_successes = 0;
        core.opened_at = None;

        tracing::info!(
            breaker = %self.name,
            previous_state = %previous_state,
            "Circuit breaker reset manually"
        );
        if previous_state != CircuitState::Closed {
            metrics::record_transition(&self.name, CircuitState::Closed);
        }
    }

    pub fn stats(&self) -> BreakerStats {
        let core = self.core.lock();
        BreakerStats {
            name: self.name.clone(),
            state: core.state,
            consecutive_failures: core.consecutive_failures,
            probe_successes: core.probe_successes,
            last_failure_at: core.last_failure_at,
            last_success_at: core.last_success_at,
            total_requests: core.total_requests,
            total_failures: core.total_failures,
            total_successes: core.total_successes,
            total_rejections: core.total_rejections,
            total_trips: core.total_trips,
        }
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("config", &self.config)
            .finish()
    }
}
