use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness endpoint.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "murmur",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
