//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define breaker metrics (calls, latency, transitions, state)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `faultline_calls_total` (counter): calls by breaker and outcome
//! - `faultline_call_duration_seconds` (histogram): wrapped call latency
//! - `faultline_transitions_total` (counter): state transitions by target state
//! - `faultline_breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//! - `faultline_diagnostics_dropped_total` (counter): trip records not queued
//! - `faultline_diagnostics_writes_total` (counter): sink writes by result

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_call(breaker: &str, outcome: &'static str, elapsed: Duration) {
    counter!("faultline_calls_total", "breaker" => breaker.to_string(), "outcome" => outcome).increment(1);
    histogram!("faultline_call_duration_seconds", "breaker" => breaker.to_string()).record(elapsed.as_secs_f64());
}

pub fn record_rejection(breaker: &str) {
    counter!("faultline_calls_total", "breaker" => breaker.to_string(), "outcome" => "rejected").increment(1);
}

pub fn record_transition(breaker: &str, to: CircuitState) {
    counter!("faultline_transitions_total", "breaker" => breaker.to_string(), "to" => to.as_str()).increment(1);
    gauge!("faultline_breaker_state", "breaker" => breaker.to_string()).set(to.as_gauge());
}

pub fn record_diagnostics_dropped(reason: &'static str) {
    counter!("faultline_diagnostics_dropped_total", "reason" => reason).increment(1);
}

pub fn record_diagnostics_delivered(sink: &'static str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    counter!("faultline_diagnostics_writes_total", "sink" => sink, "result" => result).increment(1);
}
