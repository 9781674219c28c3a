//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds ≥ 1, durations > 0)
//! - Detect duplicate breaker names
//! - Check addresses and URLs of enabled surfaces
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FaultlineConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{BreakerSettings, FaultlineConfig, PLACEHOLDER_API_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("breaker name must not be empty")]
    EmptyName,

    #[error("duplicate breaker '{0}'")]
    DuplicateBreaker(String),

    #[error("{breaker}: {field} must be at least 1")]
    ZeroThreshold { breaker: String, field: &'static str },

    #[error("{breaker}: {field} must be greater than 0")]
    ZeroDuration { breaker: String, field: &'static str },

    #[error("diagnostics.queue_capacity must be greater than 0")]
    ZeroQueueCapacity,

    #[error("invalid webhook URL '{url}': {reason}")]
    InvalidWebhookUrl { url: String, reason: String },

    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("admin.api_key must be set when the admin API is enabled")]
    WeakApiKey,
}

pub fn validate_config(config: &FaultlineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_settings("defaults", &config.defaults, &mut errors);

    let mut seen = HashSet::new();
    for entry in &config.breakers {
        if entry.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName);
            continue;
        }
        if !seen.insert(entry.name.as_str()) {
            errors.push(ValidationError::DuplicateBreaker(entry.name.clone()));
        }
        check_settings(&entry.name, &entry.settings(&config.defaults), &mut errors);
    }

    if config.diagnostics.queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueueCapacity);
    }
    if let Some(url) = &config.diagnostics.alert_webhook_url {
        match url::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(ValidationError::InvalidWebhookUrl {
                url: url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidWebhookUrl {
                url: url.clone(),
                reason: e.to_string(),
            }),
        }
    }
    if config.diagnostics.alert_webhook_url.is_some() && config.diagnostics.alert_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration {
            breaker: "diagnostics".to_string(),
            field: "alert_timeout_ms",
        });
    }

    if config.observability.metrics_enabled {
        check_address("observability.metrics_address", &config.observability.metrics_address, &mut errors);
    }

    if config.admin.enabled {
        check_address("admin.bind_address", &config.admin.bind_address, &mut errors);
        if config.admin.api_key.is_empty() || config.admin.api_key == PLACEHOLDER_API_KEY {
            errors.push(ValidationError::WeakApiKey);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_settings(breaker: &str, settings: &BreakerSettings, errors: &mut Vec<ValidationError>) {
    if settings.failure_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold {
            breaker: breaker.to_string(),
            field: "failure_threshold",
        });
    }
    if settings.success_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold {
            breaker: breaker.to_string(),
            field: "success_threshold",
        });
    }
    if settings.cooldown_ms == 0 {
        errors.push(ValidationError::ZeroDuration {
            breaker: breaker.to_string(),
            field: "cooldown_ms",
        });
    }
    if settings.call_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration {
            breaker: breaker.to_string(),
            field: "call_timeout_ms",
        });
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
