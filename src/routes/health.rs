use axum::{routing::get, Json, Router};
use serde_json::json;
use tracing::info;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

async fn health() -> Json<serde_json::Value> {
    info!("GET /health - Health check");
    Json(json!({ "status": "ok", "service": "findash-backend" }))
}
