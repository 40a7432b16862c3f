use axum::Json;
use serde_json::{json, Value};

pub const BUILD_ID: &str = env!("MEDIASSIST_BUILD_ID");

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "build": BUILD_ID }))
}
