//! Plain HTTP endpoints served next to `/chat`.

use axum::http::header;
use axum::response::IntoResponse;

/// Exact body returned by `/health`.
pub const HEALTH_BODY: &str = r#"{"status": "UP", "message": "Сервер работает корректно."}"#;

/// Handler for GET /health - liveness only, no dependency checks.
pub async fn health_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], HEALTH_BODY)
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}
