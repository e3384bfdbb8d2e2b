//! Pipeline data types
//!
//! The trip request, stage identifiers, stage results and tool call records
//! that flow through a pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default maximum trip request length in characters
pub const DEFAULT_MAX_REQUEST_LENGTH: usize = 10_000;

/// A traveler's free-text trip request
///
/// Validated on creation and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRequest {
    content: String,
}

impl TripRequest {
    /// Validate and wrap a trip request
    ///
    /// # Errors
    /// Returns a message describing the problem when the text is blank or
    /// longer than `max_length` characters.
    pub fn new(content: impl Into<String>, max_length: usize) -> Result<Self, String> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err("Trip request cannot be empty".to_string());
        }
        let length = content.chars().count();
        if length > max_length {
            return Err(format!(
                "Trip request exceeds maximum length of {} characters (got {})",
                max_length, length
            ));
        }
        Ok(Self { content })
    }

    /// The request text
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Identifier of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Flights, lodging and a draft day-by-day plan
    TravelResearch,
    /// Meals, attractions and an itemized budget
    LocalRecommendations,
    /// Final clean itinerary
    FinalItinerary,
}

impl StageId {
    /// Stable snake_case name
    pub fn as_str(self) -> &'static str {
        match self {
            StageId::TravelResearch => "travel_research",
            StageId::LocalRecommendations => "local_recommendations",
            StageId::FinalItinerary => "final_itinerary",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ToolCallOutcome {
    /// Normalized tool output
    Success(serde_json::Value),
    /// Error message of a failed call
    Failure(String),
}

/// One tool invocation made while producing a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool identifier
    pub tool: String,
    /// Arguments supplied by the engine
    pub arguments: serde_json::Value,
    /// Output or error
    pub outcome: ToolCallOutcome,
}

impl ToolCallRecord {
    /// Whether the call succeeded
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ToolCallOutcome::Success(_))
    }
}

/// What a stage producer hands back for one stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    /// Free-form stage text
    pub text: String,
    /// Tool calls made while producing it, in order
    pub tool_calls: Vec<ToolCallRecord>,
}

impl StageOutput {
    /// Output without tool calls
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// Completed output of one stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    /// Producing stage
    pub stage: StageId,
    /// Free-form stage text
    pub text: String,
    /// When the stage completed
    pub completed_at: DateTime<Utc>,
    /// Tool calls made by the stage
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Inputs a stage receives
///
/// Only the trip request (when the task asks for it) and the output of the
/// one prior stage the task names are visible.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// The trip request, if the task consumes it
    pub request: Option<&'a TripRequest>,
    /// Output of the prior stage the task consumes
    pub prior: Option<&'a StageResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trip_request_validation() {
        assert!(TripRequest::new("  \n", 100).is_err());
        assert!(TripRequest::new("오사카", 2).is_err());
        let request = TripRequest::new("오사카", 3).unwrap();
        assert_eq!(request.content(), "오사카");
    }

    #[test]
    fn test_stage_id_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(StageId::LocalRecommendations).unwrap(),
            json!("local_recommendations")
        );
        assert_eq!(StageId::FinalItinerary.to_string(), "final_itinerary");
    }

    #[test]
    fn test_tool_call_outcome_serialization() {
        let record = ToolCallRecord {
            tool: "currency_convert".to_string(),
            arguments: json!({"amount": 1}),
            outcome: ToolCallOutcome::Failure("boom".to_string()),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["outcome"], json!({"status": "failure", "value": "boom"}));
        assert!(!record.succeeded());
    }
}
