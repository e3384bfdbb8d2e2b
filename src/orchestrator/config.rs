//! Orchestrator configuration
//!
//! Runtime-tunable settings of the pipeline. Loaded from the environment at
//! startup and updatable through `POST /api/config`.

use crate::error::AppError;
use crate::orchestrator::constants::DEFAULT_MAX_TOOL_ITERATIONS;
use crate::orchestrator::types::DEFAULT_MAX_REQUEST_LENGTH;
use serde::{Deserialize, Serialize};
use std::env;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestratorConfig {
    /// Gemini model name
    pub gemini_model: String,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
    /// Maximum trip request length in characters
    pub max_request_length: usize,
    /// Maximum engine turns per stage
    pub max_tool_iterations: usize,
    /// Language every stage writes its answer in
    pub output_language: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            gemini_model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            max_request_length: DEFAULT_MAX_REQUEST_LENGTH,
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            output_language: "Korean".to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Defaults overridden by `GEMINI_MODEL` and `OUTPUT_LANGUAGE`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            output_language: non_empty("OUTPUT_LANGUAGE").unwrap_or(defaults.output_language),
            ..defaults
        }
    }
}

/// Request body for updating orchestrator configuration
#[derive(Debug, Default, Deserialize)]
pub struct ConfigUpdateRequest {
    /// Gemini model name (optional)
    pub gemini_model: Option<String>,
    /// Sampling temperature (optional)
    pub temperature: Option<f32>,
    /// Maximum trip request length in characters (optional)
    pub max_request_length: Option<usize>,
    /// Maximum engine turns per stage (optional)
    pub max_tool_iterations: Option<usize>,
    /// Output language (optional)
    pub output_language: Option<String>,
}

/// Validate and apply configuration updates
///
/// All fields are validated before any is applied, so a rejected request
/// leaves the configuration unchanged.
///
/// # Arguments
/// * `config` - The current config to update
/// * `request` - The update request with optional fields
///
/// # Returns
/// * `Ok(OrchestratorConfig)` - The updated configuration
/// * `Err(AppError::InvalidConfig)` - If validation fails
pub fn validate_and_apply_config_update(
    mut config: OrchestratorConfig,
    request: ConfigUpdateRequest,
) -> Result<OrchestratorConfig, AppError> {
    if let Some(model) = request.gemini_model {
        if model.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "gemini_model cannot be empty".to_string(),
            ));
        }
        config.gemini_model = model;
    }

    if let Some(temperature) = request.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::InvalidConfig(format!(
                "temperature must be between 0.0 and 2.0 (got {})",
                temperature
            )));
        }
        config.temperature = temperature;
    }

    if let Some(max_length) = request.max_request_length {
        if max_length == 0 {
            return Err(AppError::InvalidConfig(
                "max_request_length must be > 0".to_string(),
            ));
        }
        config.max_request_length = max_length;
    }

    if let Some(max_iterations) = request.max_tool_iterations {
        if max_iterations == 0 {
            return Err(AppError::InvalidConfig(
                "max_tool_iterations must be > 0".to_string(),
            ));
        }
        config.max_tool_iterations = max_iterations;
    }

    if let Some(language) = request.output_language {
        if language.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "output_language cannot be empty".to_string(),
            ));
        }
        config.output_language = language;
    }

    Ok(config)
}
