//! Reasoning engine abstraction
//!
//! A stage is produced by a generative engine that either answers with text
//! or asks for tool calls. The transcript types here are engine-neutral;
//! `api_client` maps them onto the Gemini wire format.

use crate::orchestrator::error::EngineError;
use crate::tools::ToolDefinition;
use async_trait::async_trait;

/// A tool call requested by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Tool identifier
    pub name: String,
    /// JSON arguments
    pub arguments: serde_json::Value,
}

/// Output of one tool call, fed back to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    /// Tool identifier
    pub name: String,
    /// JSON output
    pub output: serde_json::Value,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Text from the user side (the rendered task prompt)
    User(String),
    /// Tool calls the engine asked for
    ToolCalls(Vec<ToolInvocation>),
    /// Results of those tool calls
    ToolResponses(Vec<ToolResponse>),
}

/// One request to the engine
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// System instruction (the agent profile)
    pub system: String,
    /// Conversation so far
    pub messages: Vec<Message>,
    /// Tools the engine may call
    pub tools: Vec<ToolDefinition>,
}

/// One engine turn
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    /// Final text
    Text(String),
    /// Request to call tools
    ToolCalls(Vec<ToolInvocation>),
}

/// A generative engine that executes stages
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Produce the next turn for a transcript
    async fn generate(&self, request: &EngineRequest) -> Result<ModelTurn, EngineError>;
}
