//! Fault-isolation layer for unreliable external dependencies.
//!
//! Call sites wrap each external call in a named [`CircuitBreaker`] taken from a
//! [`BreakerRegistry`] built at start-up. A failing dependency then degrades to
//! fallback values instead of cascading into the application.
//!
//! ```rust,no_run
//! use faultline::{BreakerConfig, BreakerRegistry};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let registry = BreakerRegistry::new();
//! let distance = registry.register(
//!     "distance",
//!     BreakerConfig::new(3, Duration::from_secs(60), Duration::from_secs(5)),
//! );
//!
//! let km = distance
//!     .execute_or(|| async { Ok::<f64, std::io::Error>(12.5) }, 0.0)
//!     .await;
//! # let _ = km;
//! # }
//! ```

pub mod admin;
pub mod config;
pub mod diagnostics;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::FaultlineConfig;
pub use diagnostics::{DiagnosticRecord, DiagnosticsDispatcher, DiagnosticsHandle, DiagnosticsSink};
pub use lifecycle::{start, FaultlineHandle, Shutdown};
pub use resilience::{BreakerConfig, BreakerError, BreakerRegistry, BreakerStats, CircuitBreaker, CircuitState};
