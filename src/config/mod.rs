//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FaultlineConfig (validated, immutable)
//!     → BreakerRegistry::from_config / DiagnosticsDispatcher::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; breakers never change configuration
//! - All fields have defaults to allow minimal configs
//! - Per-breaker entries override only the fields they set; the rest come from `[defaults]`
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AdminConfig;
pub use schema::BreakerEntry;
pub use schema::BreakerSettings;
pub use schema::DiagnosticsConfig;
pub use schema::FaultlineConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use validation::{validate_config, ValidationError};
