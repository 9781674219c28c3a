use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::resilience::BreakerStats;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub breakers: usize,
    pub open: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetSummary {
    pub reset: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let open = state.registry.open_count();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: if open == 0 { "operational" } else { "degraded" }.to_string(),
        breakers: state.registry.len(),
        open,
    })
}

pub async fn list_breakers(State(state): State<AdminState>) -> Json<Vec<BreakerStats>> {
    Json(state.registry.stats())
}

pub async fn get_breaker(
    State(state): State<AdminState>,
    Path(name): Path<String>,
) -> Result<Json<BreakerStats>, StatusCode> {
    state
        .registry
        .get(&name)
        .map(|breaker| Json(breaker.stats()))
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn reset_breaker(
    State(state): State<AdminState>,
    Path(name): Path<String>,
) -> Result<Json<BreakerStats>, StatusCode> {
    let breaker = state.registry.get(&name).ok_or(StatusCode::NOT_FOUND)?;
    breaker.reset();
    tracing::info!(breaker = %name, "Breaker reset via admin API");
    Ok(Json(breaker.stats()))
}

pub async fn reset_all_breakers(State(state): State<AdminState>) -> Json<ResetSummary> {
    let reset = state.registry.reset_all();
    tracing::info!(count = reset, "All breakers reset via admin API");
    Json(ResetSummary { reset })
}
