//! Pipeline runner
//!
//! Executes the task list in fixed sequential order. Each stage sees only
//! the trip request (when its task asks for it) and the output of the one
//! prior stage its task names. A failing stage aborts the run; later stages
//! never start.

use crate::config::Config;
use crate::orchestrator::api_client::GeminiEngine;
use crate::orchestrator::config::OrchestratorConfig;
use crate::orchestrator::error::PipelineError;
use crate::orchestrator::stage::{AgentStageProducer, StageProducer};
use crate::orchestrator::tasks::{travel_tasks, validate_tasks, TaskDefinition};
use crate::orchestrator::types::{StageContext, StageResult, TripRequest};
use crate::orchestrator::utils::{hash_request, preview};
use crate::tools::ToolRegistry;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Outcome of a successful pipeline run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Run identifier
    pub run_id: Uuid,
    /// Final stage text, verbatim
    pub result: String,
    /// Every stage result, in execution order
    pub stages: Vec<StageResult>,
}

/// Sequential stage pipeline
pub struct Pipeline {
    tasks: Vec<TaskDefinition>,
    producer: Arc<dyn StageProducer>,
    max_request_length: usize,
}

impl Pipeline {
    /// Create a pipeline over a task list
    ///
    /// # Errors
    /// * `PipelineError::InvalidTasks` if stage ids repeat or a task consumes
    ///   a stage that does not run before it
    pub fn new(
        tasks: Vec<TaskDefinition>,
        producer: Arc<dyn StageProducer>,
        max_request_length: usize,
    ) -> Result<Self, PipelineError> {
        validate_tasks(&tasks).map_err(PipelineError::InvalidTasks)?;
        Ok(Self {
            tasks,
            producer,
            max_request_length,
        })
    }

    /// The three-stage travel pipeline over a producer
    pub fn travel(
        producer: Arc<dyn StageProducer>,
        max_request_length: usize,
    ) -> Result<Self, PipelineError> {
        Self::new(travel_tasks(), producer, max_request_length)
    }

    /// The travel pipeline backed by the Gemini engine
    ///
    /// # Arguments
    /// * `config` - Application configuration (API key, Gemini base URL)
    /// * `orchestrator` - Model, temperature and loop settings
    /// * `http` - HTTP client for engine calls
    /// * `tools` - Tool registry
    pub fn from_config(
        config: &Config,
        orchestrator: &OrchestratorConfig,
        http: reqwest::Client,
        tools: Arc<ToolRegistry>,
    ) -> Result<Self, PipelineError> {
        let engine = GeminiEngine::new(
            http,
            config.credentials.gemini_api_key.clone(),
            &config.providers.gemini_api_base_url,
            &orchestrator.gemini_model,
        )
        .with_temperature(orchestrator.temperature);
        tracing::debug!(
            model = engine.model(),
            temperature = orchestrator.temperature,
            max_tool_iterations = orchestrator.max_tool_iterations,
            "Building travel pipeline"
        );
        let producer = AgentStageProducer::new(
            Arc::new(engine),
            tools,
            orchestrator.max_tool_iterations,
            &orchestrator.output_language,
        );
        Self::travel(Arc::new(producer), orchestrator.max_request_length)
    }

    /// The task list, in execution order
    pub fn tasks(&self) -> &[TaskDefinition] {
        &self.tasks
    }

    /// Run every stage for one trip request
    ///
    /// # Errors
    /// * `PipelineError::InvalidRequest` if the request is blank or too long
    /// * `PipelineError::StageFailed` naming the first stage that failed
    pub async fn run(&self, content: &str) -> Result<PipelineRun, PipelineError> {
        let request = TripRequest::new(content, self.max_request_length)
            .map_err(PipelineError::InvalidRequest)?;
        let run_id = Uuid::new_v4();
        let request_hash = hash_request(request.content());
        let run_start = Instant::now();

        tracing::info!(
            run_id = %run_id,
            request_hash = %request_hash,
            stage_count = self.tasks.len(),
            "Starting pipeline run"
        );

        let mut completed: Vec<StageResult> = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            let prior = task
                .context_from
                .and_then(|source| completed.iter().find(|result| result.stage == source));
            let context = StageContext {
                request: task.include_request.then_some(&request),
                prior,
            };

            let stage_start = Instant::now();
            let output = match self.producer.produce(task, context).await {
                Ok(output) => output,
                Err(source) => {
                    tracing::error!(
                        run_id = %run_id,
                        stage = %task.stage,
                        tool_call_count = source.tool_calls().len(),
                        error = %source,
                        "Stage failed, aborting pipeline"
                    );
                    return Err(PipelineError::StageFailed {
                        stage: task.stage,
                        source,
                    });
                }
            };

            tracing::info!(
                run_id = %run_id,
                stage = %task.stage,
                tool_call_count = output.tool_calls.len(),
                output_len = output.text.len(),
                duration_ms = stage_start.elapsed().as_millis() as u64,
                "Stage completed"
            );
            tracing::debug!(
                run_id = %run_id,
                stage = %task.stage,
                output_preview = %preview(&output.text, 200),
                "Stage output"
            );

            completed.push(StageResult {
                stage: task.stage,
                text: output.text,
                completed_at: Utc::now(),
                tool_calls: output.tool_calls,
            });
        }

        let result = completed
            .last()
            .map(|stage| stage.text.clone())
            .unwrap_or_default();

        tracing::info!(
            run_id = %run_id,
            request_hash = %request_hash,
            duration_ms = run_start.elapsed().as_millis() as u64,
            "Pipeline run completed"
        );

        Ok(PipelineRun {
            run_id,
            result,
            stages: completed,
        })
    }
}
