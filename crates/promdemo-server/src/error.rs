//! HTTP mapping for `DemoError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use promdemo_core::error::{ClientCode, DemoError};

/// Handler error: wraps the shared error so it can become a response.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub DemoError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::BadLabels | ClientCode::BadName => StatusCode::BAD_REQUEST,
            ClientCode::NotFound => StatusCode::NOT_FOUND,
            ClientCode::BadConfig
            | ClientCode::AlreadyExists
            | ClientCode::CollectFailed
            | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": code.as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
