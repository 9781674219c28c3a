//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems from a validated configuration
//! - Start background tasks (diagnostics dispatcher, admin API, metrics)
//! - Hand the registry to the embedding application
//!
//! # Design Decisions
//! - Subsystems initialize in order, not concurrently
//! - The admin listener binds last, once every breaker is registered
//! - Logging is not initialized here; the application owns its subscriber

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::admin::{self, AdminState};
use crate::config::FaultlineConfig;
use crate::diagnostics::{DiagnosticsDispatcher, DiagnosticsError};
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;
use crate::resilience::BreakerRegistry;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("diagnostics setup failed: {0}")]
    Diagnostics(#[from] DiagnosticsError),

    #[error("metrics setup failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("failed to bind admin listener: {0}")]
    Bind(#[from] std::io::Error),
}

/// Running fault-isolation layer.
pub struct FaultlineHandle {
    registry: Arc<BreakerRegistry>,
    shutdown: Shutdown,
    tasks: Vec<JoinHandle<()>>,
    admin_addr: Option<SocketAddr>,
}

impl FaultlineHandle {
    /// Registry to inject into call sites.
    pub fn registry(&self) -> Arc<BreakerRegistry> {
        self.registry.clone()
    }

    /// Bound address of the admin API, when enabled.
    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin_addr
    }

    /// Stop background tasks and wait for them to finish.
    pub async fn shutdown(self) {
        tracing::info!("Faultline shutting down");
        self.shutdown.trigger();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Background task failed during shutdown");
            }
        }
        tracing::info!("Shutdown complete");
    }
}

/// Start every subsystem described by `config`.
///
/// `config` is expected to have passed `validate_config`.
pub async fn start(config: &FaultlineConfig) -> Result<FaultlineHandle, StartupError> {
    let shutdown = Shutdown::new();
    let mut tasks = Vec::new();

    if config.observability.metrics_enabled {
        let addr = parse_addr("observability.metrics_address", &config.observability.metrics_address)?;
        metrics::init_metrics(addr)?;
    }

    let (dispatcher, handle) = DiagnosticsDispatcher::from_config(&config.diagnostics)?;
    tasks.push(dispatcher.spawn(shutdown.subscribe()));

    let registry = Arc::new(BreakerRegistry::from_config(config, Some(handle)));

    let mut admin_addr = None;
    if config.admin.enabled {
        let addr = parse_addr("admin.bind_address", &config.admin.bind_address)?;
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let router = admin::setup_admin_router(AdminState::new(registry.clone(), &config.admin.api_key));
        let server_shutdown = shutdown.subscribe();

        tasks.push(tokio::spawn(async move {
            if let Err(e) = admin::serve(listener, router, server_shutdown).await {
                tracing::error!(error = %e, "Admin server failed");
            }
        }));
        admin_addr = Some(local_addr);
    }

    tracing::info!(
        breakers = registry.len(),
        admin = ?admin_addr,
        "Faultline started"
    );

    Ok(FaultlineHandle {
        registry,
        shutdown,
        tasks,
        admin_addr,
    })
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, StartupError> {
    value.parse().map_err(|_| StartupError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}
