//! Orchestration error types
//!
//! One enum per layer: the reasoning engine, a single stage, and the whole
//! pipeline run.

use crate::orchestrator::types::{StageId, ToolCallRecord};
use crate::tools::ToolError;
use thiserror::Error;

/// Errors from the reasoning engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// No API key is configured
    #[error("GEMINI_API_KEY is not set or is empty")]
    MissingApiKey,

    /// The request could not be sent or did not complete
    #[error("Failed to send HTTP request to Gemini API: {0}")]
    Request(String),

    /// The engine rejected the request for rate reasons
    #[error("Gemini API rate limit exceeded (HTTP 429): {0}")]
    RateLimited(String),

    /// Non-success HTTP status
    #[error("Gemini API returned error status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw error body
        body: String,
    },

    /// The response body could not be decoded
    #[error("Failed to parse JSON response from Gemini API: {0}")]
    Decode(String),

    /// The prompt was blocked
    #[error("Gemini API blocked the prompt: {0}")]
    Blocked(String),

    /// The response had no usable candidate content
    #[error("Gemini API response is empty: {0}")]
    EmptyResponse(String),
}

/// Errors that fail a single stage
#[derive(Error, Debug)]
pub enum StageError {
    /// The reasoning engine failed
    #[error("Reasoning engine error: {0}")]
    Engine(#[from] EngineError),

    /// A tool call failed
    #[error("Tool '{tool}' failed: {source}")]
    ToolFailed {
        /// Tool that failed
        tool: String,
        /// Underlying tool error
        #[source]
        source: ToolError,
        /// Tool calls made so far, including the failing one
        calls: Vec<ToolCallRecord>,
    },

    /// The engine asked for a tool the stage may not use
    #[error("Tool '{0}' is not available to this stage")]
    ToolNotPermitted(String),

    /// The task definition names a tool that is not registered
    #[error("Tool '{0}' is not registered")]
    UnknownTool(String),

    /// The engine kept calling tools past the iteration cap
    #[error("Tool loop exceeded maximum iterations ({0})")]
    ToolLoopExceeded(usize),

    /// The engine finished with blank text
    #[error("Stage produced empty output")]
    EmptyOutput,
}

impl StageError {
    /// Tool calls recorded before the failure, if the error carries them
    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        match self {
            StageError::ToolFailed { calls, .. } => calls,
            _ => &[],
        }
    }
}

/// Errors that fail a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The trip request failed validation
    #[error("Invalid trip request: {0}")]
    InvalidRequest(String),

    /// The task list is malformed
    #[error("Invalid task definitions: {0}")]
    InvalidTasks(String),

    /// A stage failed; later stages did not run
    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        /// Stage that failed
        stage: StageId,
        /// Why it failed
        #[source]
        source: StageError,
    },
}

impl PipelineError {
    /// The stage that failed, if any
    pub fn failed_stage(&self) -> Option<StageId> {
        match self {
            PipelineError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failure_names_stage_and_tool() {
        let err = PipelineError::StageFailed {
            stage: StageId::TravelResearch,
            source: StageError::ToolFailed {
                tool: "flight_search".to_string(),
                source: ToolError::provider("Amadeus", Some(500), "boom"),
                calls: Vec::new(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("travel_research"));
        assert!(message.contains("flight_search"));
        assert!(message.contains("HTTP 500"));
        assert_eq!(err.failed_stage(), Some(StageId::TravelResearch));
    }
}
