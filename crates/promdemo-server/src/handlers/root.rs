use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::{app_state::AppState, error::ApiError};

pub const GREETING: &str = "Hello from demo app!";

pub async fn hello(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    tracing::info!(
        service = %state.service(),
        method = %method,
        path = %uri.path(),
        user_agent = %user_agent,
        "Request received"
    );

    let status = StatusCode::OK;
    state
        .http_requests()
        .inc(&[("method", method.as_str()), ("status", status.as_str())])?;

    tracing::info!(
        service = %state.service(),
        method = %method,
        path = %uri.path(),
        status = status.as_u16(),
        "Response sent"
    );
    Ok((status, GREETING).into_response())
}
