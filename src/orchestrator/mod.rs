//! Orchestrator module
//!
//! The three-stage travel pipeline: task definitions, agent profiles, the
//! reasoning engine seam with its Gemini implementation, the per-stage tool
//! loop and the sequential pipeline runner.

pub mod agents;
pub mod api_client;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod gemini_types;
pub mod pipeline;
pub mod stage;
pub mod tasks;
pub mod tool_loop;
pub mod types;
pub mod utils;

pub use error::{EngineError, PipelineError, StageError};
pub use pipeline::{Pipeline, PipelineRun};
pub use types::{StageId, StageResult, TripRequest};
