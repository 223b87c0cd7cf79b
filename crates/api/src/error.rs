//! API Error Types

use alerting::AlertingError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use objective_service::ServiceError;
use objectives::ModelError;
use serde_json::json;
use thiserror::Error;

/// Errors returned by API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed query parameters
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No objective matches the selector
    #[error("Objective not found: {0}")]
    NotFound(String),

    /// The objective service failed
    #[error("Objective service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Metrics exporter not installed")]
    MetricsUnavailable,
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<AlertingError> for ApiError {
    fn from(err: AlertingError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Service(_) => StatusCode::BAD_GATEWAY,
            ApiError::MetricsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
