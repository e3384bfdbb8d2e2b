//! Lookup tools
//!
//! Read-only adapters over external provider APIs. Each tool accepts JSON
//! arguments (as produced by the reasoning engine), validates them into a
//! typed input, calls its provider and returns a JSON-serialized typed
//! output.
//!
//! Tools are collected in a [`ToolRegistry`]; pipeline stages only see the
//! subset of tools their task definition names.

pub mod amadeus;
pub mod currency;
pub mod error;
pub mod flight;
pub mod hotel;
pub mod http;
pub mod locations;
pub mod places;
pub mod token_cache;

pub use error::ToolError;

use crate::config::Config;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Declaration of a tool as advertised to the reasoning engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool identifier (must be a valid function name for the engine)
    pub name: String,
    /// What the tool does, written for the engine
    pub description: String,
    /// JSON schema of the tool arguments
    pub parameters: serde_json::Value,
}

/// A read-only lookup tool
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool identifier
    fn name(&self) -> &str;

    /// Declaration passed to the reasoning engine
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with engine-supplied JSON arguments
    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}

/// Parse engine-supplied arguments into a typed tool input
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    tool: &str,
    arguments: serde_json::Value,
) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::invalid_arguments(tool, e.to_string()))
}

/// Serialize a typed tool output for the engine
pub(crate) fn to_output<T: Serialize>(tool: &str, output: &T) -> Result<serde_json::Value, ToolError> {
    serde_json::to_value(output).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: format!("output could not be serialized: {}", e),
    })
}

/// Registry of available tools, keyed by name
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry of every travel tool from configuration
    ///
    /// Missing credentials do not fail here; a tool whose credential is
    /// absent fails with `ToolError::MissingCredential` when it is called.
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        let providers = &config.providers;
        let credentials = &config.credentials;

        let amadeus = Arc::new(amadeus::AmadeusClient::new(
            http.clone(),
            &providers.amadeus_base_url,
            credentials.amadeus_client_credentials(),
            providers.token_safety_margin(),
        ));
        let places = Arc::new(places::PlacesClient::new(
            http.clone(),
            &providers.google_places_base_url,
            credentials.google_api_key.clone(),
            &providers.language,
        ));

        let mut registry = Self::new();
        registry.register(Arc::new(flight::FlightSearchTool::new(
            amadeus.clone(),
            &providers.currency,
        )));
        registry.register(Arc::new(hotel::HotelSearchTool::new(amadeus)));
        registry.register(Arc::new(places::NearbyPlacesTool::new(
            places.clone(),
            places::PlaceCategory::TouristAttraction,
        )));
        registry.register(Arc::new(places::NearbyPlacesTool::new(
            places,
            places::PlaceCategory::Restaurant,
        )));
        registry.register(Arc::new(currency::CurrencyConvertTool::new(
            http,
            &providers.exchange_rate_base_url,
            credentials.exchange_rate_api_key.clone(),
        )));
        registry
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Whether a tool with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Declarations for the named tools, in the order given
    ///
    /// Names without a registered tool are skipped.
    pub fn definitions_for(&self, names: &[&str]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|name| self.tools.get(*name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Names of all registered tools, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Invoke a tool by name
    pub async fn call(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.call(arguments).await
    }
}
