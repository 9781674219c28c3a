//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breakers and the diagnostics dispatcher produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metrics are cheap (atomic increments) and no-ops until a recorder is installed
//! - Initialization is left to the embedding application

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
