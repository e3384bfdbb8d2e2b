//! Shared HTTP plumbing for provider adapters
//!
//! Maps transport failures, timeouts, non-success statuses and undecodable
//! bodies onto `ToolError::Provider` so every adapter reports them the same
//! way.

use crate::tools::error::ToolError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build the HTTP client shared by every provider adapter
///
/// Every request issued through this client is bounded by `timeout`.
pub fn build_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Send a request, mapping transport errors to `ToolError::Provider`
pub async fn send(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ToolError> {
    request.send().await.map_err(|e| {
        let detail = if e.is_timeout() {
            format!("request timed out: {}", e)
        } else {
            format!("failed to send request: {}", e)
        };
        tracing::warn!(provider = provider, error = %e, "Provider request did not complete");
        ToolError::provider(provider, None, detail)
    })
}

/// Check the status of a response and decode its JSON body
///
/// # Errors
/// * `ToolError::Provider` carrying the raw body when the status is not a
///   success, or carrying the parse error and body when decoding fails.
pub async fn read_json<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, ToolError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        ToolError::provider(
            provider,
            Some(status.as_u16()),
            format!("failed to read response body: {}", e),
        )
    })?;

    if !status.is_success() {
        tracing::error!(
            provider = provider,
            status_code = status.as_u16(),
            error_body = %body,
            "Provider returned error status"
        );
        return Err(ToolError::provider(provider, Some(status.as_u16()), body));
    }

    serde_json::from_str(&body).map_err(|e| {
        ToolError::provider(
            provider,
            Some(status.as_u16()),
            format!("failed to parse JSON response: {} - Response body: {}", e, body),
        )
    })
}
