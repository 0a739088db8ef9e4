pub(super) mod inventory;
pub(super) mod members;
pub(super) mod products;
pub(super) mod users;

use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// `GET /health` - returns `{ "ok": true }`.
pub(super) async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}
