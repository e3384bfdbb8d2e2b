//! Gemini API client
//!
//! Direct HTTP client for the Gemini `generateContent` endpoint with
//! function calling. This is the production [`ReasoningEngine`].

use crate::orchestrator::engine::{
    EngineRequest, Message, ModelTurn, ReasoningEngine, ToolInvocation,
};
use crate::orchestrator::error::EngineError;
use crate::orchestrator::gemini_types::{
    Content, FunctionCall, FunctionDeclaration, FunctionResponse, GeminiApiRequest,
    GeminiApiResponse, GenerationConfig, Part, ToolDeclarations,
};
use async_trait::async_trait;

/// Default Gemini API base URL
pub const DEFAULT_GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const ROLE_USER: &str = "user";
const ROLE_MODEL: &str = "model";

/// Gemini-backed reasoning engine
pub struct GeminiEngine {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl GeminiEngine {
    /// Create an engine
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client (connection pooling, timeouts)
    /// * `api_key` - Gemini API key; checked on every call
    /// * `base_url` - API base URL (overridable for tests)
    /// * `model` - Model name, e.g. "gemini-2.5-flash"
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        base_url: &str,
        model: &str,
    ) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature: None,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Model this engine calls
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Map an engine-neutral request onto the Gemini wire format
fn build_request(request: &EngineRequest, temperature: Option<f32>) -> GeminiApiRequest {
    let contents = request
        .messages
        .iter()
        .map(|message| match message {
            Message::User(text) => Content {
                role: Some(ROLE_USER.to_string()),
                parts: vec![Part::text(text.clone())],
            },
            Message::ToolCalls(calls) => Content {
                role: Some(ROLE_MODEL.to_string()),
                parts: calls
                    .iter()
                    .map(|call| Part {
                        function_call: Some(FunctionCall {
                            name: call.name.clone(),
                            args: call.arguments.clone(),
                        }),
                        ..Default::default()
                    })
                    .collect(),
            },
            Message::ToolResponses(responses) => Content {
                role: Some(ROLE_USER.to_string()),
                parts: responses
                    .iter()
                    .map(|response| Part {
                        function_response: Some(FunctionResponse {
                            name: response.name.clone(),
                            // functionResponse.response must be an object
                            response: serde_json::json!({ "result": response.output }),
                        }),
                        ..Default::default()
                    })
                    .collect(),
            },
        })
        .collect();

    let tools = if request.tools.is_empty() {
        Vec::new()
    } else {
        vec![ToolDeclarations {
            function_declarations: request
                .tools
                .iter()
                .map(|tool| FunctionDeclaration {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                })
                .collect(),
        }]
    };

    GeminiApiRequest {
        system_instruction: (!request.system.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part::text(request.system.clone())],
        }),
        contents,
        tools,
        generation_config: temperature.map(|temperature| GenerationConfig {
            temperature: Some(temperature),
        }),
    }
}

/// Extract the next turn from a decoded response
fn parse_turn(parsed: GeminiApiResponse) -> Result<ModelTurn, EngineError> {
    // Check for blocked prompt
    if let Some(reason) = parsed
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.clone())
    {
        return Err(EngineError::Blocked(reason));
    }

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::EmptyResponse("response contains no candidates".to_string()))?;

    let content = candidate.content.ok_or_else(|| {
        EngineError::EmptyResponse(format!(
            "candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })?;

    let mut calls = Vec::new();
    let mut texts = Vec::new();
    for part in content.parts {
        if let Some(call) = part.function_call {
            calls.push(ToolInvocation {
                name: call.name,
                arguments: call.args,
            });
        } else if let Some(text) = part.text {
            texts.push(text);
        }
    }

    if !calls.is_empty() {
        return Ok(ModelTurn::ToolCalls(calls));
    }
    if texts.is_empty() {
        return Err(EngineError::EmptyResponse(
            "candidate contains no text or function call parts".to_string(),
        ));
    }
    Ok(ModelTurn::Text(texts.concat()))
}

#[async_trait]
impl ReasoningEngine for GeminiEngine {
    async fn generate(&self, request: &EngineRequest) -> Result<ModelTurn, EngineError> {
        let api_key = self.api_key.as_deref().ok_or(EngineError::MissingApiKey)?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = build_request(request, self.temperature);

        tracing::debug!(
            url = %url,
            model = %self.model,
            message_count = request.messages.len(),
            tool_count = request.tools.len(),
            "Calling Gemini API"
        );

        // Make POST request using shared client (connection pooling)
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Request(e.to_string()))?;

        // Check HTTP status
        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            tracing::error!(
                status_code = status_code,
                error_body = %error_body,
                "Gemini API returned error status"
            );

            if status_code == 429 {
                return Err(EngineError::RateLimited(error_body));
            }
            return Err(EngineError::Status {
                status: status_code,
                body: error_body,
            });
        }

        let response_body = response
            .text()
            .await
            .map_err(|e| EngineError::Request(format!("failed to read response body: {}", e)))?;

        let parsed: GeminiApiResponse = serde_json::from_str(&response_body)
            .map_err(|e| EngineError::Decode(format!("{} - Response body: {}", e, response_body)))?;

        let turn = parse_turn(parsed)?;
        match &turn {
            ModelTurn::Text(text) => tracing::debug!(
                response_len = text.len(),
                "Received text response from Gemini API"
            ),
            ModelTurn::ToolCalls(calls) => tracing::debug!(
                call_count = calls.len(),
                "Received function calls from Gemini API"
            ),
        }
        Ok(turn)
    }
}
