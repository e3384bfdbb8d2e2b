//! Error types and error handling for the application
//!
//! This module defines the HTTP-facing error type. All errors implement
//! `IntoResponse` to provide consistent error formatting.

use crate::orchestrator::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body is invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration update is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Another pipeline run is in progress
    #[error("A trip is already being planned; try again when it finishes")]
    PipelineBusy,

    /// Pipeline run failed
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            AppError::PipelineBusy => StatusCode::CONFLICT,
            AppError::Pipeline(PipelineError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            AppError::Pipeline(PipelineError::InvalidTasks(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Pipeline(PipelineError::StageFailed { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        if let AppError::Pipeline(PipelineError::StageFailed { stage, .. }) = &self {
            body["stage"] = json!(stage);
        }

        (status, Json(body)).into_response()
    }
}
