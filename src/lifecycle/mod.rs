//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → metrics → diagnostics dispatcher → registry → admin API
//!
//! Shutdown (shutdown.rs):
//!     trigger() → admin API stops accepting → dispatcher drains its queue → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: breakers exist before anything can observe them
//! - Fail fast: any startup error is returned to the embedding application
//! - The registry outlives shutdown; breakers keep working without side channels

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, FaultlineHandle, StartupError};
