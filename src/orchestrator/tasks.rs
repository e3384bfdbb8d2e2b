//! Task definitions
//!
//! The three stages of the travel pipeline and how each one's prompt is
//! rendered from the trip request and the prior stage's output.
//!
//! Stages:
//! - `travel_research`: trip request only; flights, hotels, currency
//! - `local_recommendations`: trip request + stage 1; places, currency
//! - `final_itinerary`: stage 2 only; no tools

use crate::orchestrator::agents::{
    AgentProfile, ITINERARY_COORDINATOR, LOCAL_EXPERT, TRAVEL_EXPERT,
};
use crate::orchestrator::constants::{
    TOOL_CURRENCY_CONVERT, TOOL_FLIGHT_SEARCH, TOOL_HOTEL_SEARCH, TOOL_NEARBY_ATTRACTIONS,
    TOOL_NEARBY_RESTAURANTS,
};
use crate::orchestrator::types::{StageContext, StageId};
use std::collections::HashSet;

/// Specification of one pipeline stage
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    /// Stage identifier
    pub stage: StageId,
    /// Responsible actor
    pub agent: AgentProfile,
    /// Natural-language instruction
    pub description: &'static str,
    /// Described (not enforced) output shape
    pub expected_output: &'static str,
    /// Tools the stage may call
    pub tools: Vec<&'static str>,
    /// Whether the trip request is part of the stage context
    pub include_request: bool,
    /// Prior stage whose output is part of the stage context
    pub context_from: Option<StageId>,
}

/// The travel pipeline, in execution order
pub fn travel_tasks() -> Vec<TaskDefinition> {
    vec![
        TaskDefinition {
            stage: StageId::TravelResearch,
            agent: TRAVEL_EXPERT,
            description: "Based on the traveler's request below, write a day-by-day travel plan \
                          that includes round-trip flights and lodging. Look up real flight offers \
                          for both directions and available hotels for the stay, and convert \
                          prices when they are not in the traveler's currency.",
            expected_output: "A basic day-by-day itinerary with a draft of costs, including the \
                              round-trip flights and lodging.",
            tools: vec![TOOL_FLIGHT_SEARCH, TOOL_HOTEL_SEARCH, TOOL_CURRENCY_CONVERT],
            include_request: true,
            context_from: None,
        },
        TaskDefinition {
            stage: StageId::LocalRecommendations,
            agent: LOCAL_EXPERT,
            description: "Review the day-by-day itinerary and costs drafted in the previous step. \
                          Add popular local restaurants and dishes for breakfast, lunch, dinner and \
                          snacks (with prices), and recommend attractions worth visiting (with \
                          costs). Then write a detailed travel budget that accounts for exchange \
                          rates, with every budget item clearly itemized.",
            expected_output: "An updated day-by-day itinerary with local restaurants and \
                              attractions, plus a detailed budget table.",
            tools: vec![
                TOOL_NEARBY_ATTRACTIONS,
                TOOL_NEARBY_RESTAURANTS,
                TOOL_CURRENCY_CONVERT,
            ],
            include_request: true,
            context_from: Some(StageId::TravelResearch),
        },
        TaskDefinition {
            stage: StageId::FinalItinerary,
            agent: ITINERARY_COORDINATOR,
            description: "Combine the results of the previous steps into a clean, final travel \
                          itinerary. Make the day-by-day schedule and the budget clear and easy to \
                          read so it can be handed to the traveler.",
            expected_output: "The final travel plan for the traveler: flight details, lodging \
                              details, total cost, day-by-day schedule, detailed budget table and \
                              additional information.",
            tools: Vec::new(),
            include_request: false,
            context_from: Some(StageId::LocalRecommendations),
        },
    ]
}

/// Check that a task list can run as a sequential pipeline
///
/// # Errors
/// Returns a message when the list is empty, a stage id repeats, or a
/// `context_from` does not name an earlier stage.
pub fn validate_tasks(tasks: &[TaskDefinition]) -> Result<(), String> {
    if tasks.is_empty() {
        return Err("Pipeline has no tasks".to_string());
    }

    let mut seen = HashSet::new();
    for task in tasks {
        if let Some(source) = task.context_from {
            if !seen.contains(&source) {
                return Err(format!(
                    "Stage '{}' consumes '{}', which does not run before it",
                    task.stage, source
                ));
            }
        }
        if !seen.insert(task.stage) {
            return Err(format!("Stage '{}' appears more than once", task.stage));
        }
    }
    Ok(())
}

/// Render the user prompt of a stage
///
/// # Arguments
/// * `task` - Stage being produced
/// * `context` - Trip request and prior stage output visible to the stage
/// * `language` - Language the answer must be written in
pub fn render_prompt(task: &TaskDefinition, context: &StageContext<'_>, language: &str) -> String {
    let mut prompt = String::from(task.description);

    if let Some(request) = context.request {
        prompt.push_str("\n\nTraveler's request:\n");
        prompt.push_str(request.content());
    }

    if let Some(prior) = context.prior {
        prompt.push_str(&format!(
            "\n\nThis is the context you're working with (output of the '{}' step):\n",
            prior.stage
        ));
        prompt.push_str(&prior.text);
    }

    prompt.push_str("\n\nThis is the expected criteria for your final answer: ");
    prompt.push_str(task.expected_output);
    prompt.push_str(&format!(
        "\nWrite your entire final answer in {}.",
        language
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::types::{StageResult, TripRequest};
    use chrono::Utc;

    #[test]
    fn test_travel_tasks_are_valid_and_ordered() {
        let tasks = travel_tasks();
        assert!(validate_tasks(&tasks).is_ok());
        let stages: Vec<StageId> = tasks.iter().map(|t| t.stage).collect();
        assert_eq!(
            stages,
            vec![
                StageId::TravelResearch,
                StageId::LocalRecommendations,
                StageId::FinalItinerary
            ]
        );
        assert!(tasks[2].tools.is_empty());
        assert!(!tasks[2].include_request);
    }

    #[test]
    fn test_validate_rejects_forward_context() {
        let mut tasks = travel_tasks();
        tasks[0].context_from = Some(StageId::FinalItinerary);
        let err = validate_tasks(&tasks).unwrap_err();
        assert!(err.contains("does not run before it"));
    }

    #[test]
    fn test_validate_rejects_self_context_and_duplicates() {
        let mut tasks = travel_tasks();
        tasks[1].context_from = Some(StageId::LocalRecommendations);
        assert!(validate_tasks(&tasks).is_err());

        let mut tasks = travel_tasks();
        tasks[2].stage = StageId::TravelResearch;
        tasks[2].context_from = None;
        assert!(validate_tasks(&tasks).unwrap_err().contains("more than once"));

        assert!(validate_tasks(&[]).is_err());
    }

    #[test]
    fn test_render_prompt_includes_only_given_context() {
        let tasks = travel_tasks();
        let request = TripRequest::new("오사카 2박 3일", 100).unwrap();
        let prior = StageResult {
            stage: StageId::LocalRecommendations,
            text: "STAGE TWO TEXT".to_string(),
            completed_at: Utc::now(),
            tool_calls: Vec::new(),
        };

        let final_prompt = render_prompt(
            &tasks[2],
            &StageContext {
                request: None,
                prior: Some(&prior),
            },
            "Korean",
        );
        assert!(final_prompt.contains("STAGE TWO TEXT"));
        assert!(final_prompt.contains("local_recommendations"));
        assert!(!final_prompt.contains("오사카 2박 3일"));
        assert!(final_prompt.ends_with("in Korean."));

        let first_prompt = render_prompt(
            &tasks[0],
            &StageContext {
                request: Some(&request),
                prior: None,
            },
            "Korean",
        );
        assert!(first_prompt.contains("오사카 2박 3일"));
        assert!(!first_prompt.contains("context you're working with"));
    }
}
