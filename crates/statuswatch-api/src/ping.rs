//! Liveness probe. No store access, no auth, always 200.

use axum::{Json, response::IntoResponse};
use serde_json::json;

/// `GET /ping`
pub async fn handler() -> impl IntoResponse {
  Json(json!({ "status": "ok" }))
}
