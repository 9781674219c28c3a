//! Registry of named breakers.
//!
//! # Responsibilities
//! - Own one breaker per logical dependency
//! - Create breakers at start-up from config or lazily on first use
//! - Aggregate statistics and resets for the operator surface

use dashmap::DashMap;
use std::sync::Arc;

use crate::config::FaultlineConfig;
use crate::diagnostics::DiagnosticsHandle;
use crate::resilience::circuit_breaker::{BreakerConfig, CircuitBreaker};
use crate::resilience::stats::{BreakerStats, CircuitState};

/// Process-wide set of breakers, shared via `Arc` with every call site.
#[derive(Debug, Default)]
pub struct BreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    /// Configuration for breakers created lazily.
    defaults: BreakerConfig,
    diagnostics: Option<DiagnosticsHandle>,
}

impl BreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: BreakerConfig) -> Self {
        Self {
            defaults,
            ..Default::default()
        }
    }

    /// Attach the diagnostics handle given to every breaker created afterwards.
    pub fn with_diagnostics(mut self, handle: DiagnosticsHandle) -> Self {
        self.diagnostics = Some(handle);
        self
    }

    /// Build a registry holding every breaker declared in `config`.
    pub fn from_config(config: &FaultlineConfig, diagnostics: Option<DiagnosticsHandle>) -> Self {
        let registry = Self {
            breakers: DashMap::new(),
            defaults: config.defaults.to_breaker_config(),
            diagnostics,
        };
        for (name, breaker_config) in config.breaker_configs() {
            registry.register(&name, breaker_config);
        }
        tracing::info!(breakers = registry.len(), "Breaker registry initialized");
        registry
    }

    /// Get the breaker named `name`, creating it with `config` if absent.
    ///
    /// An existing breaker keeps its original configuration.
    pub fn register(&self, name: &str, config: BreakerConfig) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(name) {
            if existing.config() != &config.clone().clamped() {
                tracing::warn!(
                    breaker = %name,
                    "Breaker already registered with a different configuration, keeping the original"
                );
            }
            return existing.value().clone();
        }

        self.breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(breaker = %name, config = ?config, "Registering breaker");
                Arc::new(self.build(name, config))
            })
            .value()
            .clone()
    }

    /// Get the breaker named `name`, creating it with the registry defaults if absent.
    pub fn get_or_default(&self, name: &str) -> Arc<CircuitBreaker> {
        self.register(name, self.defaults.clone())
    }

    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.breakers.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Snapshot of every breaker, sorted by name.
    pub fn stats(&self) -> Vec<BreakerStats> {
        let mut stats: Vec<BreakerStats> = self.breakers.iter().map(|entry| entry.value().stats()).collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }

    /// Number of breakers currently open.
    pub fn open_count(&self) -> usize {
        self.breakers
            .iter()
            .filter(|entry| entry.value().state() == CircuitState::Open)
            .count()
    }

    /// Reset one breaker. Returns `false` if no breaker has that name.
    pub fn reset(&self, name: &str) -> bool {
        match self.get(name) {
            Some(breaker) => {
                breaker.reset();
                true
            }
            None => false,
        }
    }

    /// Reset every breaker, returning how many were reset.
    pub fn reset_all(&self) -> usize {
        let breakers: Vec<Arc<CircuitBreaker>> = self.breakers.iter().map(|entry| entry.value().clone()).collect();
        for breaker in &breakers {
            breaker.reset();
        }
        tracing::info!(count = breakers.len(), "All circuit breakers reset");
        breakers.len()
    }

    fn build(&self, name: &str, config: BreakerConfig) -> CircuitBreaker {
        let breaker = CircuitBreaker::new(name, config);
        match &self.diagnostics {
            Some(handle) => breaker.with_diagnostics(handle.clone()),
            None => breaker,
        }
    }
}
