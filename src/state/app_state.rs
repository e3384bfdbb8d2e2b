//! Application state shared by the HTTP handlers
//!
//! Holds configuration, the shared HTTP client, the tool registry (and
//! through it each provider's token cache), and the gate that admits one
//! pipeline run at a time.

use crate::config::Config;
use crate::orchestrator::config::OrchestratorConfig;
use crate::orchestrator::{Pipeline, PipelineError};
use crate::tools::http::build_http_client;
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Main application state
///
/// Cheap to clone; every field is a shared handle.
#[derive(Clone)]
pub struct AppState {
    /// Static configuration loaded at startup
    pub config: Arc<Config>,
    /// Runtime-updatable orchestrator settings
    pub orchestrator_config: Arc<RwLock<OrchestratorConfig>>,
    /// HTTP client shared by the lookup providers
    pub http: reqwest::Client,
    /// HTTP client for the reasoning engine, with its own longer timeout
    pub engine_http: reqwest::Client,
    /// Lookup tools, built once so token caches outlive single runs
    pub tools: Arc<ToolRegistry>,
    run_gate: Arc<Mutex<()>>,
}

impl AppState {
    /// Build the application state
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn new(config: Config, orchestrator_config: OrchestratorConfig) -> anyhow::Result<Self> {
        let http = build_http_client(config.providers.timeout())?;
        let engine_http = build_http_client(config.providers.engine_timeout())?;
        let tools = Arc::new(ToolRegistry::from_config(&config, http.clone()));
        Ok(Self {
            config: Arc::new(config),
            orchestrator_config: Arc::new(RwLock::new(orchestrator_config)),
            http,
            engine_http,
            tools,
            run_gate: Arc::new(Mutex::new(())),
        })
    }

    /// Claim the single pipeline slot
    ///
    /// Returns `None` while another run holds it. The slot is released when
    /// the guard is dropped.
    pub fn try_begin_run(&self) -> Option<OwnedMutexGuard<()>> {
        self.run_gate.clone().try_lock_owned().ok()
    }

    /// Build a pipeline from the current orchestrator settings
    pub async fn pipeline(&self) -> Result<Pipeline, PipelineError> {
        let orchestrator_config = self.orchestrator_config.read().await.clone();
        Pipeline::from_config(
            &self.config,
            &orchestrator_config,
            self.engine_http.clone(),
            self.tools.clone(),
        )
    }
}
