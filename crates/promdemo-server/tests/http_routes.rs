//! Router-level tests: every request goes through the real axum stack via `oneshot`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::routing::get as get_route;
use axum::Router;
use tower::ServiceExt;

use promdemo_core::error::{DemoError, Result};
use promdemo_core::metrics::{Collector, MetricFamily, Registry};
use promdemo_server::app_state::AppState;
use promdemo_server::config::ServerConfig;
use promdemo_server::router::{build_router, with_timeout};

fn test_state() -> AppState {
    AppState::new(ServerConfig::default()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn scrape(router: &Router) -> String {
    let resp = router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_string(resp).await
}

#[tokio::test]
async fn root_returns_greeting() {
    let router = build_router(test_state());

    let resp = router.oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap().to_string();
    assert!(ct.starts_with("text/plain"));
    assert_eq!(body_string(resp).await, "Hello from demo app!");
}

#[tokio::test]
async fn counter_tracks_every_root_call() {
    let state = test_state();
    let router = build_router(state.clone());

    for _ in 0..7 {
        let resp = router.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let count = state
        .http_requests()
        .get(&[("method", "GET"), ("status", "200")])
        .unwrap();
    assert_eq!(count, Some(7));
}

#[tokio::test]
async fn metrics_reflects_one_prior_call() {
    let router = build_router(test_state());

    router.clone().oneshot(get("/")).await.unwrap();

    let resp = router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4; charset=utf-8"
    );
    let body = body_string(resp).await;
    assert!(body.contains("# HELP http_requests_total Total number of HTTP requests\n"));
    assert!(body.contains("# TYPE http_requests_total counter\n"));
    assert!(body.contains("http_requests_total{method=\"GET\",status=\"200\"} 1\n"));
}

#[tokio::test]
async fn scraping_does_not_change_the_counter() {
    let router = build_router(test_state());
    router.clone().oneshot(get("/")).await.unwrap();
    router.clone().oneshot(get("/")).await.unwrap();

    let line = |body: &str| {
        body.lines()
            .find(|l| l.starts_with("http_requests_total{"))
            .map(str::to_string)
            .unwrap()
    };
    let first = scrape(&router).await;
    let second = scrape(&router).await;
    assert_eq!(line(&first), "http_requests_total{method=\"GET\",status=\"200\"} 2");
    assert_eq!(line(&first), line(&second));
}

#[tokio::test]
async fn metrics_lines_follow_exposition_grammar() {
    let router = build_router(test_state());
    router.clone().oneshot(get("/")).await.unwrap();

    for line in scrape(&router).await.lines() {
        if line.starts_with('#') {
            assert!(line.starts_with("# HELP ") || line.starts_with("# TYPE "), "{line}");
            continue;
        }
        let (series, value) = line.rsplit_once(' ').unwrap();
        assert!(
            value.parse::<f64>().is_ok() || matches!(value, "NaN" | "+Inf" | "-Inf"),
            "{line}"
        );
        let name = series.split('{').next().unwrap();
        assert!(!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':'));
        if series.contains('{') {
            assert!(series.ends_with('}'), "{line}");
        }
    }
}

#[tokio::test]
async fn process_metrics_are_exposed_by_default() {
    let router = build_router(test_state());
    let body = scrape(&router).await;
    assert!(body.contains("# TYPE process_start_time_seconds gauge\n"));
    assert!(body.contains("# TYPE process_uptime_seconds gauge\n"));
}

#[tokio::test]
async fn process_metrics_can_be_disabled() {
    let mut cfg = ServerConfig::default();
    cfg.metrics.process = false;
    let router = build_router(AppState::new(cfg).unwrap());
    let body = scrape(&router).await;
    assert!(!body.contains("process_start_time_seconds"));
    assert!(body.contains("# TYPE http_requests_total counter\n"));
}

#[tokio::test]
async fn unknown_route_is_404_and_wrong_method_is_405() {
    let state = test_state();
    let router = build_router(state.clone());

    let resp = router.clone().oneshot(get("/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let post = Request::builder().method("POST").uri("/").body(Body::empty()).unwrap();
    let resp = router.oneshot(post).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    // Neither counts as a served greeting.
    assert_eq!(state.http_requests().get(&[("method", "POST"), ("status", "200")]).unwrap(), None);
}

struct FailingCollector;

impl Collector for FailingCollector {
    fn name(&self) -> &str {
        "failing"
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        Err(DemoError::Collect {
            collector: "failing".into(),
            reason: "sample source unavailable".into(),
        })
    }
}

#[tokio::test]
async fn render_failure_becomes_500() {
    let registry = Arc::new(Registry::new());
    registry.register_collector(Arc::new(FailingCollector)).unwrap();
    let state = AppState::with_registry(ServerConfig::default(), registry).unwrap();
    let router = build_router(state);

    let resp = router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(body["error"], "COLLECT_FAILED");
    assert!(body["message"].as_str().unwrap().contains("sample source unavailable"));

    // The greeting route keeps working.
    let resp = router.oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn slow_request_gets_408() {
    let cfg = ServerConfig::default();
    let routes = Router::new()
        .route("/", get_route(|| async { "fast" }))
        .route(
            "/slow",
            get_route(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                "too late"
            }),
        );
    let router = with_timeout(routes, cfg.server.request_timeout_ms);

    let resp = router.clone().oneshot(get("/slow")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);

    let resp = router.oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "fast");
}
