//! OAuth2 client-credentials token cache
//!
//! One `TokenCache` exists per provider that needs bearer tokens. It is
//! owned by that provider's client and shared by handle (`Arc`) between the
//! tools using the provider, so there is no process-wide token state.
//!
//! The read-or-refresh sequence runs under a single async mutex: concurrent
//! callers wait for an in-flight exchange instead of starting their own.

use crate::tools::error::ToolError;
use crate::tools::http;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

/// Client id/secret pair for a client-credentials exchange
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    /// OAuth2 client id
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
}

/// A bearer token with the absolute instant the provider says it expires
#[derive(Debug, Clone, PartialEq)]
pub struct CachedToken {
    /// Bearer token value
    pub access_token: String,
    /// Absolute expiry reported by the provider
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Whether the token may still be handed out at `now`
    ///
    /// A token stops being usable `margin` before its expiry. A margin too
    /// large to subtract from the expiry makes the token unusable.
    pub fn is_usable_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at
            .checked_sub_signed(margin)
            .is_some_and(|stale_at| now < stale_at)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Per-provider token cache
pub struct TokenCache {
    provider: String,
    token_url: String,
    /// `Err` holds the name of the first missing credential variable
    credentials: Result<ClientCredentials, &'static str>,
    safety_margin: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Create an empty cache
    ///
    /// # Arguments
    /// * `provider` - Provider name used in errors and logs
    /// * `token_url` - Full URL of the provider's token endpoint
    /// * `credentials` - Client credentials, or the name of the missing variable
    /// * `safety_margin` - How long before expiry a token is considered stale
    pub fn new(
        provider: &str,
        token_url: String,
        credentials: Result<ClientCredentials, &'static str>,
        safety_margin: std::time::Duration,
    ) -> Self {
        Self {
            provider: provider.to_string(),
            token_url,
            credentials,
            safety_margin: Duration::from_std(safety_margin).unwrap_or(Duration::MAX),
            cached: Mutex::new(None),
        }
    }

    /// Seed the cache with an existing token
    pub fn with_cached_token(self, token: CachedToken) -> Self {
        Self {
            cached: Mutex::new(Some(token)),
            ..self
        }
    }

    /// Snapshot of the currently cached token, if any
    pub async fn cached_token(&self) -> Option<CachedToken> {
        self.cached.lock().await.clone()
    }

    /// Return a currently valid bearer token, refreshing it if needed
    ///
    /// # Errors
    /// * `ToolError::MissingCredential` if client credentials are not configured
    /// * `ToolError::AuthFailure` if the token endpoint rejects the exchange
    /// * `ToolError::Provider` on transport failure or an undecodable body
    pub async fn get_token(&self, client: &reqwest::Client) -> Result<String, ToolError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_usable_at(Utc::now(), self.safety_margin) {
                return Ok(token.access_token.clone());
            }
            tracing::debug!(
                provider = %self.provider,
                expires_at = %token.expires_at,
                "Cached token is within the safety margin, refreshing"
            );
        }

        let fresh = self.exchange(client).await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn exchange(&self, client: &reqwest::Client) -> Result<CachedToken, ToolError> {
        let credentials = self
            .credentials
            .as_ref()
            .map_err(|missing| ToolError::MissingCredential(*missing))?;

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let requested_at = Utc::now();
        let response = http::send(&self.provider, client.post(&self.token_url).form(&form)).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::error!(
                provider = %self.provider,
                status_code = status.as_u16(),
                error_body = %body,
                "Token exchange rejected"
            );
            return Err(ToolError::AuthFailure {
                provider: self.provider.clone(),
                body,
            });
        }

        let token: TokenResponse = http::read_json(&self.provider, response).await?;
        let expires_at = Duration::try_seconds(token.expires_in)
            .and_then(|lifetime| requested_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                ToolError::provider(
                    &self.provider,
                    None,
                    format!("token lifetime out of range: expires_in={}", token.expires_in),
                )
            })?;

        tracing::info!(
            provider = %self.provider,
            expires_at = %expires_at,
            "Obtained new access token"
        );

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}
