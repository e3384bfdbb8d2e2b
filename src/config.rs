//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. Credentials are optional at startup; a tool whose
//! credential is missing fails when it is called.

use crate::tools::token_cache::ClientCredentials;
use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Provider credentials
    pub credentials: CredentialsConfig,
    /// Provider endpoints and request tuning
    pub providers: ProviderConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Provider credentials, each read from its own environment variable
#[derive(Clone, Default)]
pub struct CredentialsConfig {
    /// `AMADEUS_CLIENT_ID`
    pub amadeus_client_id: Option<String>,
    /// `AMADEUS_CLIENT_SECRET`
    pub amadeus_client_secret: Option<String>,
    /// `GOOGLE_API_KEY`
    pub google_api_key: Option<String>,
    /// `EXCHANGE_RATE_API_KEY`
    pub exchange_rate_api_key: Option<String>,
    /// `GEMINI_API_KEY`
    pub gemini_api_key: Option<String>,
}

// Secrets never reach the logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn presence(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "<set>"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("CredentialsConfig")
            .field("amadeus_client_id", &presence(&self.amadeus_client_id))
            .field("amadeus_client_secret", &presence(&self.amadeus_client_secret))
            .field("google_api_key", &presence(&self.google_api_key))
            .field("exchange_rate_api_key", &presence(&self.exchange_rate_api_key))
            .field("gemini_api_key", &presence(&self.gemini_api_key))
            .finish()
    }
}

impl CredentialsConfig {
    /// Amadeus client credentials, or the name of the first missing variable
    pub fn amadeus_client_credentials(&self) -> Result<ClientCredentials, &'static str> {
        let client_id = self
            .amadeus_client_id
            .clone()
            .ok_or("AMADEUS_CLIENT_ID")?;
        let client_secret = self
            .amadeus_client_secret
            .clone()
            .ok_or("AMADEUS_CLIENT_SECRET")?;
        Ok(ClientCredentials {
            client_id,
            client_secret,
        })
    }
}

/// Provider endpoints and request tuning
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Amadeus API base URL
    pub amadeus_base_url: String,
    /// Google Places API base URL
    pub google_places_base_url: String,
    /// ExchangeRate-API base URL
    pub exchange_rate_base_url: String,
    /// Gemini API base URL
    pub gemini_api_base_url: String,
    /// Timeout applied to every lookup provider request (in seconds)
    pub timeout_secs: u64,
    /// Timeout applied to each Gemini `generateContent` call (in seconds)
    pub engine_timeout_secs: u64,
    /// Seconds before token expiry at which a cached token is refreshed
    pub token_safety_margin_secs: u64,
    /// Currency flight offers are priced in
    pub currency: String,
    /// Language code place lookups are localized to
    pub language: String,
}

impl ProviderConfig {
    /// Lookup provider request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reasoning engine request timeout
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs)
    }

    /// Token refresh safety margin
    pub fn token_safety_margin(&self) -> Duration {
        Duration::from_secs(self.token_safety_margin_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let string_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());
        let number_or = |key: &str, default: u64| {
            var(key)
                .and_then(|value| value.parse().ok())
                .unwrap_or(default)
        };

        Self {
            server: ServerConfig {
                port: var("PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: string_or("HOST", "0.0.0.0"),
            },
            credentials: CredentialsConfig {
                amadeus_client_id: var("AMADEUS_CLIENT_ID"),
                amadeus_client_secret: var("AMADEUS_CLIENT_SECRET"),
                google_api_key: var("GOOGLE_API_KEY"),
                exchange_rate_api_key: var("EXCHANGE_RATE_API_KEY"),
                gemini_api_key: var("GEMINI_API_KEY"),
            },
            providers: ProviderConfig {
                amadeus_base_url: string_or(
                    "AMADEUS_BASE_URL",
                    crate::tools::amadeus::DEFAULT_BASE_URL,
                ),
                google_places_base_url: string_or(
                    "GOOGLE_PLACES_BASE_URL",
                    crate::tools::places::DEFAULT_BASE_URL,
                ),
                exchange_rate_base_url: string_or(
                    "EXCHANGE_RATE_BASE_URL",
                    crate::tools::currency::DEFAULT_BASE_URL,
                ),
                gemini_api_base_url: string_or(
                    "GEMINI_API_BASE_URL",
                    crate::orchestrator::api_client::DEFAULT_GEMINI_API_BASE_URL,
                ),
                timeout_secs: number_or("PROVIDER_TIMEOUT_SECS", 30).max(1),
                engine_timeout_secs: number_or("GEMINI_TIMEOUT_SECS", 180).max(1),
                token_safety_margin_secs: number_or("TOKEN_SAFETY_MARGIN_SECS", 60),
                currency: string_or("TRAVEL_CURRENCY", "KRW"),
                language: string_or("TRAVEL_LANGUAGE", "ko"),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.providers.timeout(), Duration::from_secs(30));
        assert_eq!(config.providers.engine_timeout(), Duration::from_secs(180));
        assert_eq!(config.providers.token_safety_margin(), Duration::from_secs(60));
        assert_eq!(config.providers.currency, "KRW");
        assert_eq!(config.providers.language, "ko");
        assert_eq!(
            config.providers.amadeus_base_url,
            "https://test.api.amadeus.com"
        );
        assert!(config.credentials.gemini_api_key.is_none());
    }

    #[test]
    fn test_from_lookup_overrides_and_ignores_blank_values() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "9000"),
            ("TRAVEL_CURRENCY", "USD"),
            ("PROVIDER_TIMEOUT_SECS", "not-a-number"),
            ("GEMINI_TIMEOUT_SECS", "300"),
            ("GOOGLE_API_KEY", "  "),
            ("AMADEUS_CLIENT_ID", "id"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.providers.currency, "USD");
        assert_eq!(config.providers.timeout_secs, 30);
        assert_eq!(config.providers.engine_timeout(), Duration::from_secs(300));
        assert!(config.credentials.google_api_key.is_none());
        assert_eq!(
            config.credentials.amadeus_client_credentials().unwrap_err(),
            "AMADEUS_CLIENT_SECRET"
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let credentials = CredentialsConfig {
            gemini_api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<set>"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        env::set_var("PORT", "8181");
        env::set_var("AMADEUS_CLIENT_ID", "env-id");
        env::set_var("AMADEUS_CLIENT_SECRET", "env-secret");

        let config = Config::from_env();

        env::remove_var("PORT");
        env::remove_var("AMADEUS_CLIENT_ID");
        env::remove_var("AMADEUS_CLIENT_SECRET");

        assert_eq!(config.server.port, 8181);
        let credentials = config.credentials.amadeus_client_credentials().unwrap();
        assert_eq!(credentials.client_id, "env-id");
        assert_eq!(credentials.client_secret, "env-secret");
    }
}
