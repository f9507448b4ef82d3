//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::api::types::ApiContext;

/// `GET /health` — 200 once the analysis warm-up has completed, 503 while
/// pipelines are still loading so a load balancer can hold traffic.
pub async fn check(State(ctx): State<ApiContext>) -> Response {
    if ctx.readiness.is_ready() {
        (StatusCode::OK, Json(json!({"status": "healthy"}))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "loading"})),
        )
            .into_response()
    }
}
