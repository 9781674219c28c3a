//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the fault-isolation
//! layer. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::resilience::BreakerConfig;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FaultlineConfig {
    /// Settings applied to every breaker unless overridden.
    pub defaults: BreakerSettings,

    /// Named breakers created at start-up.
    pub breakers: Vec<BreakerEntry>,

    /// Trip record delivery.
    pub diagnostics: DiagnosticsConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Operator control surface.
    pub admin: AdminConfig,
}

impl FaultlineConfig {
    /// Resolved breaker configuration for every `[[breakers]]` entry.
    pub fn breaker_configs(&self) -> Vec<(String, BreakerConfig)> {
        self.breakers
            .iter()
            .map(|entry| (entry.name.clone(), entry.resolve(&self.defaults)))
            .collect()
    }
}

/// Complete breaker settings, as used by `[defaults]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerSettings {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,

    /// Time spent open before probing, in milliseconds.
    pub cooldown_ms: u64,

    /// Per-call deadline in milliseconds.
    pub call_timeout_ms: u64,

    /// Consecutive probe successes required to close again.
    pub success_threshold: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        let config = BreakerConfig::default();
        Self {
            failure_threshold: config.failure_threshold,
            cooldown_ms: config.cooldown.as_millis() as u64,
            call_timeout_ms: config.call_timeout.as_millis() as u64,
            success_threshold: config.success_threshold,
        }
    }
}

impl BreakerSettings {
    pub fn to_breaker_config(&self) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: self.failure_threshold,
            cooldown: Duration::from_millis(self.cooldown_ms),
            call_timeout: Duration::from_millis(self.call_timeout_ms),
            success_threshold: self.success_threshold,
        }
    }
}

/// One `[[breakers]]` entry; unset fields fall back to `[defaults]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BreakerEntry {
    /// Dependency name, used for registry lookup, logs and metrics.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_threshold: Option<u32>,
}

impl BreakerEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure_threshold: None,
            cooldown_ms: None,
            call_timeout_ms: None,
            success_threshold: None,
        }
    }

    /// Merge this entry over `defaults`.
    pub fn settings(&self, defaults: &BreakerSettings) -> BreakerSettings {
        BreakerSettings {
            failure_threshold: self.failure_threshold.unwrap_or(defaults.failure_threshold),
            cooldown_ms: self.cooldown_ms.unwrap_or(defaults.cooldown_ms),
            call_timeout_ms: self.call_timeout_ms.unwrap_or(defaults.call_timeout_ms),
            success_threshold: self.success_threshold.unwrap_or(defaults.success_threshold),
        }
    }

    pub fn resolve(&self, defaults: &BreakerSettings) -> BreakerConfig {
        self.settings(defaults).to_breaker_config()
    }
}

/// Diagnostics side-channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Bounded queue size between breakers and the dispatcher.
    pub queue_capacity: usize,

    /// Write every trip record to the `faultline::diagnostics` log target.
    pub log_records: bool,

    /// Optional alerting webhook receiving each record as JSON.
    pub alert_webhook_url: Option<String>,

    /// Alert webhook request timeout in milliseconds.
    pub alert_timeout_ms: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            log_records: true,
            alert_webhook_url: None,
            alert_timeout_ms: 3000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Pretty output for development, JSON for production.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin control surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

/// Placeholder key rejected by validation when the admin API is enabled.
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
