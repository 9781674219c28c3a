//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call site:
//!     → registry.rs (look up the breaker for the dependency)
//!     → circuit_breaker.rs (admit, fast-fail or probe)
//!     → timeouts.rs (enforce the per-call deadline)
//!     → circuit_breaker.rs (record outcome, transition, emit trip record)
//!     → value, fallback or BreakerError back to the caller
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every wrapped call has a deadline
//! - Circuit breaker prevents cascading failures
//! - The registry is constructed by the application and injected, never global

pub mod circuit_breaker;
pub mod error;
pub mod registry;
pub mod stats;
pub mod timeouts;

pub use circuit_breaker::{BreakerConfig, CircuitBreaker};
pub use error::BreakerError;
pub use registry::BreakerRegistry;
pub use stats::{BreakerStats, CircuitState};
