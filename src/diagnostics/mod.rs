//! Diagnostics side-channel for breaker trips.
//!
//! # Data Flow
//! ```text
//! CircuitBreaker trips
//!     → DiagnosticsHandle::dispatch (try_send, never blocks)
//!     → bounded queue
//!     → DiagnosticsDispatcher worker
//!     → every DiagnosticsSink (append-only log, alert webhook)
//! ```
//!
//! # Design Decisions
//! - Delivery is best-effort: a full queue drops the record, a failing sink is
//!   logged at debug level and skipped
//! - Nothing in this module can fail or delay a wrapped call
//! - Sinks run sequentially on one worker; each sink bounds its own latency

pub mod dispatcher;
pub mod record;
pub mod sink;

pub use dispatcher::{DiagnosticsDispatcher, DiagnosticsHandle};
pub use record::DiagnosticRecord;
pub use sink::{DiagnosticsError, DiagnosticsSink, TracingSink, WebhookSink};
