use super::ENDPOINTS;
use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Image Processing API" }))
}

/// GET /api
pub async fn index() -> Json<Value> {
    Json(json!({ "status": "ok", "endpoints": ENDPOINTS }))
}
