//! Orchestrator API handlers
//!
//! HTTP entry points for planning a trip and for reading or updating the
//! orchestrator settings. Only one pipeline run is admitted at a time; a
//! request arriving while another run is in progress gets `409 Conflict`.

use crate::error::AppError;
use crate::orchestrator::config::{
    validate_and_apply_config_update, ConfigUpdateRequest, OrchestratorConfig,
};
use crate::orchestrator::types::ToolCallRecord;
use crate::orchestrator::utils::hash_request;
use crate::orchestrator::{PipelineRun, StageId, TripRequest};
use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Itinerary request
#[derive(Deserialize, Debug)]
pub struct ItineraryRequest {
    /// Free-text trip request
    pub content: String,
}

/// Summary of one completed stage
#[derive(Serialize, Debug)]
pub struct StageSummary {
    /// Stage identifier
    pub stage: StageId,
    /// When the stage completed
    pub completed_at: DateTime<Utc>,
    /// Tool calls made by the stage
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Itinerary response
#[derive(Serialize, Debug)]
pub struct ItineraryResponse {
    /// Run identifier
    pub run_id: String,
    /// Final itinerary text
    pub result: String,
    /// Stages in execution order
    pub stages: Vec<StageSummary>,
}

impl From<PipelineRun> for ItineraryResponse {
    fn from(run: PipelineRun) -> Self {
        Self {
            run_id: run.run_id.to_string(),
            result: run.result,
            stages: run
                .stages
                .into_iter()
                .map(|stage| StageSummary {
                    stage: stage.stage,
                    completed_at: stage.completed_at,
                    tool_calls: stage.tool_calls,
                })
                .collect(),
        }
    }
}

/// POST /api/itinerary - Plan a trip
///
/// Runs the three-stage pipeline for the request and returns the final
/// itinerary text with per-stage tool call records.
///
/// # Errors
/// * `AppError::InvalidRequest` / 400 for a blank or oversized request
/// * `AppError::PipelineBusy` / 409 while another run is in progress
/// * `AppError::Pipeline` / 502 when a stage fails
pub async fn create_itinerary(
    State(state): State<AppState>,
    Json(request): Json<ItineraryRequest>,
) -> Result<Json<ItineraryResponse>, AppError> {
    let max_length = state.orchestrator_config.read().await.max_request_length;
    let trip_request =
        TripRequest::new(request.content, max_length).map_err(AppError::InvalidRequest)?;

    let _run_guard = state.try_begin_run().ok_or_else(|| {
        tracing::warn!("Rejecting itinerary request, another run is in progress");
        AppError::PipelineBusy
    })?;

    let request_hash = hash_request(trip_request.content());
    let start = Instant::now();
    tracing::info!(request_hash = %request_hash, "Itinerary request accepted");

    let pipeline = state.pipeline().await?;
    let run = pipeline.run(trip_request.content()).await.map_err(|e| {
        tracing::error!(
            request_hash = %request_hash,
            duration_ms = start.elapsed().as_millis() as u64,
            error = %e,
            "Itinerary request failed"
        );
        AppError::from(e)
    })?;

    tracing::info!(
        request_hash = %request_hash,
        run_id = %run.run_id,
        duration_ms = start.elapsed().as_millis() as u64,
        "Itinerary request completed"
    );

    Ok(Json(ItineraryResponse::from(run)))
}

/// GET /api/config - Current orchestrator settings
pub async fn get_config(State(state): State<AppState>) -> Json<OrchestratorConfig> {
    Json(state.orchestrator_config.read().await.clone())
}

/// POST /api/config - Partially update orchestrator settings
///
/// The update is validated as a whole; an invalid field rejects the request
/// and leaves the settings unchanged. Runs already in progress keep the
/// settings they started with.
pub async fn update_config(
    State(state): State<AppState>,
    Json(request): Json<ConfigUpdateRequest>,
) -> Result<Json<OrchestratorConfig>, AppError> {
    let mut current = state.orchestrator_config.write().await;
    let updated = validate_and_apply_config_update(current.clone(), request)?;
    *current = updated.clone();

    tracing::info!(
        gemini_model = %updated.gemini_model,
        temperature = updated.temperature,
        max_tool_iterations = updated.max_tool_iterations,
        "Orchestrator configuration updated"
    );
    Ok(Json(updated))
}
