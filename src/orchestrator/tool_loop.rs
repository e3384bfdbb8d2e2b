//! Tool loop
//!
//! Drives one stage against a reasoning engine: request a turn, dispatch
//! any requested tool calls one at a time, feed the results back, and stop
//! when the engine answers with text. A call rejected for its arguments is
//! answered with `{"error": ...}` so the engine can retry; any other tool
//! error fails the stage.

use crate::orchestrator::engine::{
    EngineRequest, Message, ModelTurn, ReasoningEngine, ToolResponse,
};
use crate::orchestrator::error::StageError;
use crate::orchestrator::types::{StageId, StageOutput, ToolCallOutcome, ToolCallRecord};
use crate::tools::ToolRegistry;
use serde_json::json;
use std::time::Instant;

/// Runs the engine/tool exchange for a single stage
pub struct ToolLoop<'a> {
    engine: &'a dyn ReasoningEngine,
    registry: &'a ToolRegistry,
    max_iterations: usize,
}

impl<'a> ToolLoop<'a> {
    /// Create a loop over an engine and the tool registry
    ///
    /// `max_iterations` caps the number of engine turns per stage.
    pub fn new(
        engine: &'a dyn ReasoningEngine,
        registry: &'a ToolRegistry,
        max_iterations: usize,
    ) -> Self {
        Self {
            engine,
            registry,
            max_iterations,
        }
    }

    /// Produce one stage
    ///
    /// # Arguments
    /// * `stage` - Stage being produced (for logging)
    /// * `system` - System instruction
    /// * `prompt` - Rendered task prompt
    /// * `allowed_tools` - Tools the stage may call
    ///
    /// # Errors
    /// * `StageError::UnknownTool` if an allowed tool is not registered
    /// * `StageError::ToolNotPermitted` if the engine calls another tool
    /// * `StageError::ToolFailed` on the first tool call that fails for a
    ///   reason other than its arguments
    /// * `StageError::ToolLoopExceeded` when the turn cap is reached
    /// * `StageError::EmptyOutput` if the final text is blank
    /// * `StageError::Engine` when the engine fails
    pub async fn run(
        &self,
        stage: StageId,
        system: String,
        prompt: String,
        allowed_tools: &[&str],
    ) -> Result<StageOutput, StageError> {
        if let Some(missing) = allowed_tools
            .iter()
            .find(|name| !self.registry.contains(name))
        {
            return Err(StageError::UnknownTool(missing.to_string()));
        }

        let mut request = EngineRequest {
            system,
            messages: vec![Message::User(prompt)],
            tools: self.registry.definitions_for(allowed_tools),
        };
        let mut records: Vec<ToolCallRecord> = Vec::new();

        for iteration in 1..=self.max_iterations {
            tracing::debug!(
                stage = %stage,
                iteration = iteration,
                "Requesting engine turn"
            );

            let calls = match self.engine.generate(&request).await? {
                ModelTurn::Text(text) => {
                    if text.trim().is_empty() {
                        return Err(StageError::EmptyOutput);
                    }
                    return Ok(StageOutput {
                        text,
                        tool_calls: records,
                    });
                }
                ModelTurn::ToolCalls(calls) => calls,
            };

            let mut responses = Vec::with_capacity(calls.len());
            for call in &calls {
                if !allowed_tools.contains(&call.name.as_str()) {
                    tracing::warn!(
                        stage = %stage,
                        tool = %call.name,
                        "Engine requested a tool outside the stage's tool set"
                    );
                    return Err(StageError::ToolNotPermitted(call.name.clone()));
                }

                let start = Instant::now();
                let result = self
                    .registry
                    .call(&call.name, call.arguments.clone())
                    .await;
                let duration_ms = start.elapsed().as_millis() as u64;

                match result {
                    Ok(output) => {
                        tracing::info!(
                            stage = %stage,
                            tool = %call.name,
                            duration_ms = duration_ms,
                            "Tool call succeeded"
                        );
                        records.push(ToolCallRecord {
                            tool: call.name.clone(),
                            arguments: call.arguments.clone(),
                            outcome: ToolCallOutcome::Success(output.clone()),
                        });
                        responses.push(ToolResponse {
                            name: call.name.clone(),
                            output,
                        });
                    }
                    Err(e) if e.is_argument_error() => {
                        tracing::warn!(
                            stage = %stage,
                            tool = %call.name,
                            duration_ms = duration_ms,
                            error = %e,
                            "Tool call rejected its arguments, reporting back to engine"
                        );
                        records.push(ToolCallRecord {
                            tool: call.name.clone(),
                            arguments: call.arguments.clone(),
                            outcome: ToolCallOutcome::Failure(e.to_string()),
                        });
                        responses.push(ToolResponse {
                            name: call.name.clone(),
                            output: json!({ "error": e.to_string() }),
                        });
                    }
                    Err(e) => {
                        tracing::error!(
                            stage = %stage,
                            tool = %call.name,
                            duration_ms = duration_ms,
                            error = %e,
                            "Tool call failed"
                        );
                        records.push(ToolCallRecord {
                            tool: call.name.clone(),
                            arguments: call.arguments.clone(),
                            outcome: ToolCallOutcome::Failure(e.to_string()),
                        });
                        return Err(StageError::ToolFailed {
                            tool: call.name.clone(),
                            source: e,
                            calls: records,
                        });
                    }
                }
            }

            request.messages.push(Message::ToolCalls(calls));
            request.messages.push(Message::ToolResponses(responses));
        }

        Err(StageError::ToolLoopExceeded(self.max_iterations))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted engine and tools shared by orchestration tests

    use super::*;
    use crate::orchestrator::error::EngineError;
    use crate::tools::{Tool, ToolDefinition, ToolError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Engine that replays a fixed list of turns and records requests
    pub struct ScriptedEngine {
        turns: Mutex<VecDeque<Result<ModelTurn, EngineError>>>,
        pub requests: Mutex<Vec<EngineRequest>>,
    }

    impl ScriptedEngine {
        pub fn new(turns: Vec<Result<ModelTurn, EngineError>>) -> Self {
            Self {
                turns: Mutex::new(turns.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReasoningEngine for ScriptedEngine {
        async fn generate(&self, request: &EngineRequest) -> Result<ModelTurn, EngineError> {
            self.requests.lock().unwrap().push(request.clone());
            self.turns
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(EngineError::EmptyResponse("script exhausted".to_string())))
        }
    }

    /// Tool returning a fixed value, or failing when `fail` is set
    pub struct FixedTool {
        pub name: &'static str,
        pub output: serde_json::Value,
        pub fail: bool,
    }

    #[async_trait]
    impl Tool for FixedTool {
        fn name(&self) -> &str {
            self.name
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.name.to_string(),
                description: format!("Fixed tool {}", self.name),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }
        }

        async fn call(&self, _arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
            if self.fail {
                return Err(ToolError::provider("Amadeus", Some(500), "upstream failure"));
            }
            Ok(self.output.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::orchestrator::engine::ToolInvocation;
    use crate::tools::locations::resolve_city_code;
    use crate::tools::{Tool, ToolDefinition, ToolError};
    use serde_json::json;
    use std::sync::Arc;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixedTool {
            name: "currency_convert",
            output: json!({"converted_amount": 144231.5}),
            fail: false,
        }));
        registry.register(Arc::new(FixedTool {
            name: "flight_search",
            output: json!([]),
            fail: true,
        }));
        registry
    }

    fn call(name: &str) -> ToolInvocation {
        ToolInvocation {
            name: name.to_string(),
            arguments: json!({"amount": 100}),
        }
    }

    #[tokio::test]
    async fn test_tool_results_are_fed_back() {
        let engine = ScriptedEngine::new(vec![
            Ok(ModelTurn::ToolCalls(vec![call("currency_convert")])),
            Ok(ModelTurn::Text("Budget: 144,231 KRW".to_string())),
        ]);
        let registry = registry();
        let output = ToolLoop::new(&engine, &registry, 5)
            .run(
                StageId::LocalRecommendations,
                "system".to_string(),
                "prompt".to_string(),
                &["currency_convert"],
            )
            .await
            .unwrap();

        assert_eq!(output.text, "Budget: 144,231 KRW");
        assert_eq!(output.tool_calls.len(), 1);
        assert!(output.tool_calls[0].succeeded());

        let requests = engine.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(
            requests[1].messages[2],
            Message::ToolResponses(vec![ToolResponse {
                name: "currency_convert".to_string(),
                output: json!({"converted_amount": 144231.5}),
            }])
        );
    }

    #[tokio::test]
    async fn test_tool_failure_fails_stage_with_records() {
        let engine = ScriptedEngine::new(vec![Ok(ModelTurn::ToolCalls(vec![
            call("currency_convert"),
            call("flight_search"),
        ]))]);
        let registry = registry();
        let err = ToolLoop::new(&engine, &registry, 5)
            .run(
                StageId::TravelResearch,
                "system".to_string(),
                "prompt".to_string(),
                &["currency_convert", "flight_search"],
            )
            .await
            .unwrap_err();

        match err {
            StageError::ToolFailed {
                tool,
                source,
                calls,
            } => {
                assert_eq!(tool, "flight_search");
                assert!(matches!(source, ToolError::Provider { .. }));
                assert_eq!(calls.len(), 2);
                assert!(calls[0].succeeded());
                assert!(!calls[1].succeeded());
            }
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undeclared_tool_is_rejected() {
        let engine = ScriptedEngine::new(vec![Ok(ModelTurn::ToolCalls(vec![call(
            "flight_search",
        )]))]);
        let registry = registry();
        let err = ToolLoop::new(&engine, &registry, 5)
            .run(
                StageId::FinalItinerary,
                "system".to_string(),
                "prompt".to_string(),
                &[],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::ToolNotPermitted(ref name) if name == "flight_search"));
    }

    #[tokio::test]
    async fn test_iteration_cap() {
        let engine = ScriptedEngine::new(vec![
            Ok(ModelTurn::ToolCalls(vec![call("currency_convert")])),
            Ok(ModelTurn::ToolCalls(vec![call("currency_convert")])),
            Ok(ModelTurn::Text("never reached".to_string())),
        ]);
        let registry = registry();
        let err = ToolLoop::new(&engine, &registry, 2)
            .run(
                StageId::LocalRecommendations,
                "system".to_string(),
                "prompt".to_string(),
                &["currency_convert"],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::ToolLoopExceeded(2)));
    }

    #[tokio::test]
    async fn test_blank_text_is_empty_output() {
        let engine = ScriptedEngine::new(vec![Ok(ModelTurn::Text("  \n".to_string()))]);
        let registry = registry();
        let err = ToolLoop::new(&engine, &registry, 2)
            .run(
                StageId::FinalItinerary,
                "system".to_string(),
                "prompt".to_string(),
                &[],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::EmptyOutput));
    }

    #[tokio::test]
    async fn test_unregistered_stage_tool() {
        let engine = ScriptedEngine::new(Vec::new());
        let registry = ToolRegistry::new();
        let err = ToolLoop::new(&engine, &registry, 2)
            .run(
                StageId::TravelResearch,
                "system".to_string(),
                "prompt".to_string(),
                &["hotel_search"],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::UnknownTool(ref name) if name == "hotel_search"));
        assert!(engine.requests.lock().unwrap().is_empty());
    }

    /// Resolves `city` against the city table, like the lookup tools do
    struct CityTool;

    #[async_trait::async_trait]
    impl Tool for CityTool {
        fn name(&self) -> &str {
            "flight_search"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "flight_search".to_string(),
                description: "City lookup".to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            }
        }

        async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
            let city = arguments["city"].as_str().unwrap_or_default();
            let code = resolve_city_code(city)?;
            Ok(json!({ "code": code }))
        }
    }

    #[tokio::test]
    async fn test_engine_can_correct_unknown_city() {
        let lookup = |city: &str| ToolInvocation {
            name: "flight_search".to_string(),
            arguments: json!({ "city": city }),
        };
        let engine = ScriptedEngine::new(vec![
            Ok(ModelTurn::ToolCalls(vec![lookup("Osaka, Japan")])),
            Ok(ModelTurn::ToolCalls(vec![lookup("Osaka")])),
            Ok(ModelTurn::Text("Flights to OSA found".to_string())),
        ]);
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CityTool));

        let output = ToolLoop::new(&engine, &registry, 5)
            .run(
                StageId::TravelResearch,
                "system".to_string(),
                "prompt".to_string(),
                &["flight_search"],
            )
            .await
            .unwrap();

        assert_eq!(output.text, "Flights to OSA found");
        assert_eq!(output.tool_calls.len(), 2);
        assert!(!output.tool_calls[0].succeeded());
        assert!(output.tool_calls[1].succeeded());

        let requests = engine.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        match &requests[1].messages[2] {
            Message::ToolResponses(responses) => {
                let error = responses[0].output["error"].as_str().unwrap();
                assert!(error.contains("Osaka, Japan"));
            }
            other => panic!("Unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_reported_back() {
        let engine = ScriptedEngine::new(vec![
            Ok(ModelTurn::ToolCalls(vec![ToolInvocation {
                name: "currency_convert".to_string(),
                arguments: json!({"amount": "lots"}),
            }])),
            Ok(ModelTurn::Text("Could not convert".to_string())),
        ]);
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(crate::tools::currency::CurrencyConvertTool::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            Some("fx-key".to_string()),
        )));

        let output = ToolLoop::new(&engine, &registry, 5)
            .run(
                StageId::LocalRecommendations,
                "system".to_string(),
                "prompt".to_string(),
                &["currency_convert"],
            )
            .await
            .unwrap();

        assert_eq!(output.tool_calls.len(), 1);
        assert!(!output.tool_calls[0].succeeded());
        assert_eq!(engine.requests.lock().unwrap().len(), 2);
    }
}
