//! Stage producers
//!
//! The pipeline asks a [`StageProducer`] for each stage's output. The
//! production producer renders the task prompt and runs the tool loop
//! against a reasoning engine; tests substitute scripted producers.

use crate::orchestrator::engine::ReasoningEngine;
use crate::orchestrator::error::StageError;
use crate::orchestrator::tasks::{render_prompt, TaskDefinition};
use crate::orchestrator::tool_loop::ToolLoop;
use crate::orchestrator::types::{StageContext, StageOutput};
use crate::tools::ToolRegistry;
use async_trait::async_trait;
use std::sync::Arc;

/// Produces the output of one stage
#[async_trait]
pub trait StageProducer: Send + Sync {
    /// Produce the stage described by `task` from the given context
    async fn produce(
        &self,
        task: &TaskDefinition,
        context: StageContext<'_>,
    ) -> Result<StageOutput, StageError>;
}

/// Engine-backed producer: agent profile as system instruction, rendered
/// task prompt as the first message, task tools as callable functions
pub struct AgentStageProducer {
    engine: Arc<dyn ReasoningEngine>,
    tools: Arc<ToolRegistry>,
    max_tool_iterations: usize,
    output_language: String,
}

impl AgentStageProducer {
    /// Create a producer
    pub fn new(
        engine: Arc<dyn ReasoningEngine>,
        tools: Arc<ToolRegistry>,
        max_tool_iterations: usize,
        output_language: &str,
    ) -> Self {
        Self {
            engine,
            tools,
            max_tool_iterations,
            output_language: output_language.to_string(),
        }
    }
}

#[async_trait]
impl StageProducer for AgentStageProducer {
    async fn produce(
        &self,
        task: &TaskDefinition,
        context: StageContext<'_>,
    ) -> Result<StageOutput, StageError> {
        let prompt = render_prompt(task, &context, &self.output_language);

        tracing::debug!(
            stage = %task.stage,
            role = task.agent.role,
            prompt_len = prompt.len(),
            tool_count = task.tools.len(),
            "Producing stage"
        );

        ToolLoop::new(self.engine.as_ref(), &self.tools, self.max_tool_iterations)
            .run(
                task.stage,
                task.agent.system_instruction(),
                prompt,
                &task.tools,
            )
            .await
    }
}
