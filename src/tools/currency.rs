//! Currency conversion tool (ExchangeRate-API pair conversion)

use crate::orchestrator::constants::TOOL_CURRENCY_CONVERT;
use crate::tools::error::ToolError;
use crate::tools::http;
use crate::tools::{parse_arguments, to_output, Tool, ToolDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider name used in errors and logs
pub const PROVIDER: &str = "ExchangeRate-API";

/// Default ExchangeRate-API base URL
pub const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com";

/// Arguments accepted by `currency_convert`
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConvertInput {
    /// Source currency code, e.g. USD
    pub from_currency: String,
    /// Target currency code, e.g. KRW
    pub to_currency: String,
    /// Amount in the source currency
    pub amount: f64,
}

/// Result of a conversion
///
/// Inputs are echoed verbatim and `converted_amount` is the provider's
/// value, unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConversion {
    /// Source currency code
    pub from_currency: String,
    /// Target currency code
    pub to_currency: String,
    /// Amount requested
    pub original_amount: f64,
    /// Amount in the target currency
    pub converted_amount: f64,
    /// Rate applied by the provider
    pub conversion_rate: f64,
}

#[derive(Deserialize)]
struct PairResponse {
    result: String,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
    #[serde(default)]
    conversion_result: Option<f64>,
    #[serde(default)]
    conversion_rate: Option<f64>,
}

/// Converts an amount between two currencies
pub struct CurrencyConvertTool {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CurrencyConvertTool {
    /// Create the tool
    ///
    /// `api_key` is `EXCHANGE_RATE_API_KEY`; it is checked when the tool is
    /// called.
    pub fn new(http: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Convert an amount
    ///
    /// # Errors
    /// * `ToolError::MissingCredential` if no API key is configured
    /// * `ToolError::InvalidArguments` for blank currency codes or a
    ///   non-finite amount
    /// * `ToolError::Provider` on a non-success status, or when the provider
    ///   reports a failure (its `error-type` is carried as the detail)
    pub async fn convert(
        &self,
        input: &CurrencyConvertInput,
    ) -> Result<CurrencyConversion, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ToolError::MissingCredential("EXCHANGE_RATE_API_KEY"))?;
        validate(input)?;

        let url = format!(
            "{}/v6/{}/pair/{}/{}/{}",
            self.base_url, api_key, input.from_currency, input.to_currency, input.amount
        );

        tracing::debug!(
            tool = TOOL_CURRENCY_CONVERT,
            from_currency = %input.from_currency,
            to_currency = %input.to_currency,
            "Calling ExchangeRate-API"
        );

        let response = http::send(PROVIDER, self.http.get(&url)).await?;
        let pair: PairResponse = http::read_json(PROVIDER, response).await?;

        if pair.result != "success" {
            let error_type = pair.error_type.unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!(
                tool = TOOL_CURRENCY_CONVERT,
                error_type = %error_type,
                "Currency conversion rejected"
            );
            return Err(ToolError::provider(PROVIDER, None, error_type));
        }

        match (pair.conversion_result, pair.conversion_rate) {
            (Some(converted_amount), Some(conversion_rate)) => Ok(CurrencyConversion {
                from_currency: input.from_currency.clone(),
                to_currency: input.to_currency.clone(),
                original_amount: input.amount,
                converted_amount,
                conversion_rate,
            }),
            _ => Err(ToolError::provider(
                PROVIDER,
                None,
                "success response is missing conversion_result or conversion_rate",
            )),
        }
    }
}

fn validate(input: &CurrencyConvertInput) -> Result<(), ToolError> {
    let is_code = |code: &str| !code.is_empty() && code.chars().all(|c| c.is_ascii_alphabetic());
    if !is_code(&input.from_currency) || !is_code(&input.to_currency) {
        return Err(ToolError::invalid_arguments(
            TOOL_CURRENCY_CONVERT,
            "currency codes must be alphabetic ISO codes such as USD or KRW",
        ));
    }
    if !input.amount.is_finite() {
        return Err(ToolError::invalid_arguments(
            TOOL_CURRENCY_CONVERT,
            "amount must be a finite number",
        ));
    }
    Ok(())
}

#[async_trait]
impl Tool for CurrencyConvertTool {
    fn name(&self) -> &str {
        TOOL_CURRENCY_CONVERT
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_CURRENCY_CONVERT.to_string(),
            description: "Convert an amount from one currency to another at the current \
                          exchange rate."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "from_currency": {
                        "type": "string",
                        "description": "Source currency code, e.g. USD"
                    },
                    "to_currency": {
                        "type": "string",
                        "description": "Target currency code, e.g. KRW"
                    },
                    "amount": {
                        "type": "number",
                        "description": "Amount to convert"
                    }
                },
                "required": ["from_currency", "to_currency", "amount"]
            }),
        }
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let input: CurrencyConvertInput = parse_arguments(TOOL_CURRENCY_CONVERT, arguments)?;
        let conversion = self.convert(&input).await?;
        to_output(TOOL_CURRENCY_CONVERT, &conversion)
    }
}
