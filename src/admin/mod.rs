//! Operator control surface.
//!
//! # Routes
//! - `GET  /admin/status` - version and breaker counts
//! - `GET  /admin/breakers` - every breaker snapshot
//! - `GET  /admin/breakers/{name}` - one snapshot
//! - `POST /admin/breakers/{name}/reset` - reset one breaker
//! - `POST /admin/breakers/reset` - reset every breaker
//!
//! All routes require `Authorization: Bearer <api_key>`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::resilience::BreakerRegistry;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub registry: Arc<BreakerRegistry>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(registry: Arc<BreakerRegistry>, api_key: &str) -> Self {
        Self {
            registry,
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/breakers", get(list_breakers))
        .route("/admin/breakers/reset", post(reset_all_breakers))
        .route("/admin/breakers/{name}", get(get_breaker))
        .route("/admin/breakers/{name}/reset", post(reset_breaker))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin router until shutdown is signalled.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
