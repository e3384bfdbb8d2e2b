//! Gemini API wire types
//!
//! Structs that mirror the Gemini `generateContent` JSON format, including
//! function calling. Used to serialize requests and deserialize responses.

use serde::{Deserialize, Serialize};

/// Top-level Gemini API response
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GeminiApiResponse {
    /// List of candidate responses from the model
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Optional feedback about the prompt (e.g., if it was blocked)
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A single candidate response from the model
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of this candidate
    #[serde(default)]
    pub content: Option<Content>,
    /// Why the model stopped generating (if applicable)
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content of a request turn or a response candidate
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Content {
    /// Author of the turn ("user" or "model")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Parts of the turn
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single part: text, a function call, or a function response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Function call requested by the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    /// Function result supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

impl Part {
    /// Text part
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Function call requested by the model
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Function name
    pub name: String,
    /// Arguments object
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Function result sent back to the model
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FunctionResponse {
    /// Function name
    pub name: String,
    /// Result object
    pub response: serde_json::Value,
}

/// Feedback about the prompt (e.g., if it was blocked)
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked (if applicable)
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Request structure for Gemini API
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GeminiApiRequest {
    /// System instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Conversation turns
    pub contents: Vec<Content>,
    /// Function declarations the model may call
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDeclarations>,
    /// Optional generation configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Group of function declarations
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ToolDeclarations {
    /// Declared functions
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// One declared function
#[derive(Serialize, Debug)]
pub struct FunctionDeclaration {
    /// Function name
    pub name: String,
    /// What the function does
    pub description: String,
    /// JSON schema of the arguments
    pub parameters: serde_json::Value,
}

/// Generation configuration for requests
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}
