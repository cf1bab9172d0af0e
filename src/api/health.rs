//! Liveness endpoints. No auth, no provider calls.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

fn healthy(service: Option<&str>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: service.map(str::to_string),
    })
}

pub async fn health() -> Json<HealthResponse> {
    healthy(None)
}

pub async fn notifications_health() -> Json<HealthResponse> {
    healthy(Some("notifications"))
}

pub async fn emails_health() -> Json<HealthResponse> {
    healthy(Some("emails"))
}

pub async fn journeys_health() -> Json<HealthResponse> {
    healthy(Some("journeys"))
}
