pub mod bookings;
pub mod health;

use axum::http::StatusCode;
use axum::Json;

/// Fallback for unknown routes, matching the envelope the client expects.
pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"success": false, "message": "Route not found"})),
    )
}
