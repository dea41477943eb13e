use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use promdemo_core::metrics::exposition::CONTENT_TYPE;

use crate::{app_state::AppState, error::ApiError};

pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state.registry().render().map_err(|e| {
        tracing::error!(service = %state.service(), error = %e, "metrics render failed");
        ApiError(e)
    })?;

    tracing::debug!(service = %state.service(), bytes = body.len(), "metrics scraped");
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response())
}
