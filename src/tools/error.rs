//! Tool-specific error types
//!
//! Errors that can occur while a lookup tool talks to its provider
//! (location resolution, credential exchange, HTTP failures, bad arguments).

use thiserror::Error;

/// Errors that can occur during a tool invocation
///
/// Every variant is fatal to the invocation that produced it. Empty result
/// sets are not errors and are returned as empty collections instead.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Display name has no entry in the city code table
    #[error("Unknown location: '{0}' has no city code")]
    UnknownLocation(String),

    /// OAuth2 client-credentials exchange was rejected by the provider
    #[error("Authentication with {provider} failed: {body}")]
    AuthFailure {
        /// Provider that rejected the exchange
        provider: String,
        /// Raw error body returned by the token endpoint
        body: String,
    },

    /// Provider returned a non-success status, an explicit failure flag,
    /// an undecodable payload, or could not be reached in time
    #[error("{provider} request failed{}: {detail}", status_suffix(.status))]
    Provider {
        /// Provider that failed
        provider: String,
        /// HTTP status code, when the failure came with one
        status: Option<u16>,
        /// Raw error detail for diagnostics
        detail: String,
    },

    /// A credential required by this tool is not configured
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// Tool arguments could not be parsed or failed validation
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// Tool that received the arguments
        tool: String,
        /// Why the arguments were rejected
        reason: String,
    },

    /// No tool with this name is registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (HTTP {})", code))
        .unwrap_or_default()
}

impl ToolError {
    /// Build a provider error from a status code and raw body
    pub fn provider(provider: &str, status: Option<u16>, detail: impl Into<String>) -> Self {
        ToolError::Provider {
            provider: provider.to_string(),
            status,
            detail: detail.into(),
        }
    }

    /// Build an argument validation error for a tool
    pub fn invalid_arguments(tool: &str, reason: impl Into<String>) -> Self {
        ToolError::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a per-request provider failure
    ///
    /// Credential and authentication errors are not: they affect every call
    /// against the provider, so callers that drop individual failed lookups
    /// still propagate them.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, ToolError::Provider { .. })
    }

    /// Whether the caller can fix this error by changing its arguments
    ///
    /// Unknown city names and malformed arguments are reported back to the
    /// engine instead of failing the stage.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            ToolError::UnknownLocation(_) | ToolError::InvalidArguments { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display_with_status() {
        let err = ToolError::provider("Amadeus", Some(500), "boom");
        assert_eq!(err.to_string(), "Amadeus request failed (HTTP 500): boom");
    }

    #[test]
    fn test_provider_error_display_without_status() {
        let err = ToolError::provider("ExchangeRate-API", None, "unsupported-code");
        assert_eq!(
            err.to_string(),
            "ExchangeRate-API request failed: unsupported-code"
        );
    }

    #[test]
    fn test_is_provider_failure() {
        assert!(ToolError::provider("Google Places", None, "x").is_provider_failure());
        assert!(!ToolError::MissingCredential("GOOGLE_API_KEY").is_provider_failure());
        assert!(!ToolError::AuthFailure {
            provider: "Amadeus".to_string(),
            body: "invalid_client".to_string(),
        }
        .is_provider_failure());
    }
}
