//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;

/// Error body: `{"error": <code>, "message": <text>}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required upstream credential is absent.
    #[error("{0} not configured")]
    Config(&'static str),
    /// Client is over its daily limit. A denial, not a failure.
    #[error("Rate limited")]
    RateLimited,
    /// Upstream translation/analysis failed on the non-streaming endpoint.
    #[error("Analysis failed: {0}")]
    Analysis(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Config(name) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "config",
                format!("{name} not configured"),
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Daily limit reached. Try again tomorrow.".to_string(),
            ),
            ApiError::Analysis(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "analysis_failed",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: code, message })).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
