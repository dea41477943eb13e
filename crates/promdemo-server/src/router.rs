//! Axum router wiring.
//!
//! Exposes `/` (greeting, counted) and `/metrics` (exposition). Everything
//! else falls through to axum's default 404. All requests are bounded by the
//! configured timeout.

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tower_http::timeout::TimeoutLayer;

use crate::{app_state::AppState, handlers};

pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::root::hello))
        .route("/metrics", get(handlers::metrics::metrics));
    with_timeout(routes, state.cfg().server.request_timeout_ms).with_state(state)
}

/// Answer 408 once a request has been in flight for `timeout_ms`.
pub fn with_timeout<S>(routes: Router<S>, timeout_ms: u64) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes.layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_millis(timeout_ms),
    ))
}
