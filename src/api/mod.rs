//! API module
//!
//! HTTP request handlers and the router that wires them together

pub mod orchestrator;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always "healthy"
    pub status: String,
    /// Crate version
    pub version: String,
    /// Human-readable message
    pub message: String,
}

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Travel planner backend is healthy".to_string(),
    })
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/itinerary", post(orchestrator::create_itinerary))
        .route(
            "/api/config",
            get(orchestrator::get_config).post(orchestrator::update_config),
        )
        .with_state(state)
}
