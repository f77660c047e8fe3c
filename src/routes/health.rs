use axum::response::Json;
use serde_json::json;

/// Health check endpoint handler.
///
/// Unauthenticated; meant for load balancers and container probes.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
///
/// # Examples
/// ```bash
/// curl http://localhost:4001/ping
/// # Response: {"status":"pong"}
/// ```
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "pong" }))
}
