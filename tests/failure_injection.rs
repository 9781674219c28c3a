//! Failure injection tests against a real (mock) HTTP dependency.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use faultline::diagnostics::DiagnosticsSink;
use faultline::{BreakerConfig, BreakerRegistry, CircuitState, DiagnosticsDispatcher, Shutdown};

mod common;

#[tokio::test]
async fn test_breaker_isolates_failing_dependency() {
    let hits = Arc::new(AtomicU32::new(0));
    let healthy = Arc::new(AtomicBool::new(false));
    let (h, ok) = (hits.clone(), healthy.clone());
    let addr = common::start_programmable_backend(move || {
        let (h, ok) = (h.clone(), ok.clone());
        async move {
            h.fetch_add(1, Ordering::SeqCst);
            if ok.load(Ordering::SeqCst) {
                (200, "42.0".into())
            } else {
                (503, "Service Unavailable".into())
            }
        }
    })
    .await;

    let (sink, mut records) = common::ChannelSink::new();
    let sinks: Vec<Arc<dyn DiagnosticsSink>> = vec![sink];
    let (dispatcher, handle) = DiagnosticsDispatcher::new(16, sinks);
    let shutdown = Shutdown::new();
    let worker = dispatcher.spawn(shutdown.subscribe());

    let registry = BreakerRegistry::new().with_diagnostics(handle);
    let breaker = registry.register(
        "per_diem",
        BreakerConfig::new(3, Duration::from_millis(300), Duration::from_secs(2)),
    );
    let client = common::client();
    let url = format!("http://{}/rates", addr);

    for _ in 0..3 {
        let value = breaker
            .execute_or(|| common::fetch(client.clone(), url.clone()), "stale".to_string())
            .await;
        assert_eq!(value, "stale");
    }
    assert_eq!(breaker.state(), CircuitState::Open);
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    let record = common::next_record(&mut records).await;
    assert_eq!(record.breaker_name, "per_diem");
    assert_eq!(record.consecutive_failures, 3);
    assert_eq!(record.threshold, 3);
    assert!(record.last_error.contains("503"), "unexpected error: {}", record.last_error);

    // Open: the dependency is not touched
    let value = breaker
        .execute_or(|| common::fetch(client.clone(), url.clone()), "stale".to_string())
        .await;
    assert_eq!(value, "stale");
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    // Dependency recovers; probes close the circuit after the cooldown
    healthy.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(350)).await;

    for _ in 0..2 {
        let value = breaker
            .execute_or(|| common::fetch(client.clone(), url.clone()), "stale".to_string())
            .await;
        assert_eq!(value, "42.0");
    }

    let stats = breaker.stats();
    assert_eq!(stats.state, CircuitState::Closed);
    assert_eq!(stats.total_requests, 6);
    assert_eq!(stats.total_rejections, 1);
    assert!(stats.is_balanced());

    shutdown.trigger();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_slow_dependency_times_out() {
    let addr = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        (200, "late".into())
    })
    .await;

    let registry = BreakerRegistry::new();
    let breaker = registry.register(
        "inference",
        BreakerConfig::new(2, Duration::from_secs(60), Duration::from_millis(100)),
    );
    let client = common::client();
    let url = format!("http://{}", addr);

    let started = std::time::Instant::now();
    let err = breaker
        .call(|| common::fetch(client.clone(), url.clone()))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert!(started.elapsed() < Duration::from_millis(400));

    let _ = breaker.call(|| common::fetch(client.clone(), url.clone())).await;
    assert!(breaker.is_open());

    let err = breaker
        .call(|| common::fetch(client.clone(), url.clone()))
        .await
        .unwrap_err();
    assert!(err.is_open());
}

#[tokio::test]
async fn test_concurrent_callers_always_get_a_value() {
    let addr = common::start_programmable_backend(|| async { (500, "boom".into()) }).await;

    let registry = Arc::new(BreakerRegistry::with_defaults(BreakerConfig::new(
        5,
        Duration::from_secs(60),
        Duration::from_secs(2),
    )));
    let client = common::client();
    let url = format!("http://{}", addr);

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let registry = registry.clone();
        let (client, url) = (client.clone(), url.clone());
        tasks.push(tokio::spawn(async move {
            registry
                .get_or_default("scraper")
                .execute_or(|| common::fetch(client, url), String::from("fallback"))
                .await
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), "fallback");
    }

    let stats = registry.get("scraper").unwrap().stats();
    assert_eq!(stats.state, CircuitState::Open);
    assert_eq!(stats.total_trips, 1);
    assert_eq!(stats.total_requests, 20);
    assert!(stats.is_balanced());
}
