//! Admin API tests, in-process via `oneshot` and over a real listener.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use faultline::admin::handlers::{ResetSummary, SystemStatus};
use faultline::admin::{setup_admin_router, AdminState};
use faultline::config::parse_config;
use faultline::{BreakerConfig, BreakerRegistry, BreakerStats, CircuitState};
use tower::ServiceExt;

mod common;

const KEY: &str = "test-admin-key-0123456789";

fn router_with_tripped_breaker() -> (Router, Arc<BreakerRegistry>) {
    let registry = Arc::new(BreakerRegistry::new());
    registry.register("distance", BreakerConfig::new(1, Duration::from_secs(60), Duration::from_secs(1)));
    registry.register("per_diem", BreakerConfig::default());
    (setup_admin_router(AdminState::new(registry.clone(), KEY)), registry)
}

async fn trip(registry: &BreakerRegistry, name: &str) {
    let breaker = registry.get(name).unwrap();
    let _ = breaker.call(|| async { Err::<(), _>("refused") }).await;
    assert_eq!(breaker.state(), CircuitState::Open);
}

fn request(method: &str, uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("Authorization", format!("Bearer {}", key));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_requests_without_valid_key_are_rejected() {
    let (router, _registry) = router_with_tripped_breaker();

    let response = router.clone().oneshot(request("GET", "/admin/breakers", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .oneshot(request("POST", "/admin/breakers/reset", Some("wrong")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_reports_degraded_when_a_breaker_is_open() {
    let (router, registry) = router_with_tripped_breaker();

    let response = router.clone().oneshot(request("GET", "/admin/status", Some(KEY))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status: SystemStatus = json(response).await;
    assert_eq!(status.status, "operational");
    assert_eq!(status.breakers, 2);

    trip(&registry, "distance").await;

    let response = router.oneshot(request("GET", "/admin/status", Some(KEY))).await.unwrap();
    let status: SystemStatus = json(response).await;
    assert_eq!(status.status, "degraded");
    assert_eq!(status.open, 1);
}

#[tokio::test]
async fn test_list_and_show_breakers() {
    let (router, registry) = router_with_tripped_breaker();
    trip(&registry, "distance").await;

    let response = router.clone().oneshot(request("GET", "/admin/breakers", Some(KEY))).await.unwrap();
    let all: Vec<BreakerStats> = json(response).await;
    let names: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["distance", "per_diem"]);

    let response = router
        .clone()
        .oneshot(request("GET", "/admin/breakers/distance", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats: BreakerStats = json(response).await;
    assert_eq!(stats.state, CircuitState::Open);
    assert_eq!(stats.total_failures, 1);
    assert_eq!(stats.total_trips, 1);

    let response = router
        .oneshot(request("GET", "/admin/breakers/unknown", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_single_and_all() {
    let (router, registry) = router_with_tripped_breaker();
    trip(&registry, "distance").await;

    let response = router
        .clone()
        .oneshot(request("POST", "/admin/breakers/distance/reset", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats: BreakerStats = json(response).await;
    assert_eq!(stats.state, CircuitState::Closed);
    assert_eq!(stats.consecutive_failures, 0);
    // lifetime counters survive a reset
    assert_eq!(stats.total_failures, 1);

    let response = router
        .clone()
        .oneshot(request("POST", "/admin/breakers/unknown/reset", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    trip(&registry, "distance").await;
    let response = router
        .oneshot(request("POST", "/admin/breakers/reset", Some(KEY)))
        .await
        .unwrap();
    let summary: ResetSummary = json(response).await;
    assert_eq!(summary.reset, 2);
    assert_eq!(registry.open_count(), 0);
}

#[tokio::test]
async fn test_started_layer_serves_admin_api() {
    let config = parse_config(&format!(
        r#"
[defaults]
failure_threshold = 2

[[breakers]]
name = "inference"
call_timeout_ms = 500

[diagnostics]
log_records = false

[admin]
enabled = true
api_key = "{KEY}"
bind_address = "127.0.0.1:0"
"#
    ))
    .unwrap();

    let handle = faultline::start(&config).await.unwrap();
    let addr = handle.admin_addr().unwrap();

    let registry = handle.registry();
    for _ in 0..2 {
        let _ = registry
            .get("inference")
            .unwrap()
            .call(|| async { Err::<(), _>("model unavailable") })
            .await;
    }

    let response = common::client()
        .get(format!("http://{}/admin/breakers/inference", addr))
        .bearer_auth(KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let stats: BreakerStats = response.json().await.unwrap();
    assert_eq!(stats.state, CircuitState::Open);
    assert_eq!(stats.consecutive_failures, 2);

    handle.shutdown().await;
}
