pub mod account;
pub mod assistant;
pub mod audit;
pub mod targets;

use axum::Json;
use serde_json::{Value, json};

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
