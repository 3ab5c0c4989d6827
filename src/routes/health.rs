use axum::{http::StatusCode, response::Json};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

pub async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    (
        StatusCode::OK,
        Json(json!({ "status": "OK", "timestamp": timestamp })),
    )
}
