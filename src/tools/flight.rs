//! Flight search tool

use crate::orchestrator::constants::TOOL_FLIGHT_SEARCH;
use crate::tools::amadeus::{AmadeusClient, FlightOfferData, FlightOfferQuery};
use crate::tools::error::ToolError;
use crate::tools::locations::{known_city_names, resolve_city_code};
use crate::tools::{parse_arguments, to_output, Tool, ToolDefinition};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_adults() -> u32 {
    1
}

/// Arguments accepted by `flight_search`
#[derive(Debug, Deserialize)]
pub struct FlightSearchInput {
    /// Departure city display name
    pub origin_city: String,
    /// Arrival city display name
    pub destination_city: String,
    /// Departure date (YYYY-MM-DD)
    pub departure_date: NaiveDate,
    /// Number of adult travelers
    #[serde(default = "default_adults")]
    pub adults: u32,
}

/// One normalized flight offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    /// Total price as reported by the provider
    pub price: String,
    /// Currency of `price`
    pub currency: String,
    /// Origin location code
    pub origin: String,
    /// Destination location code
    pub destination: String,
    /// Requested departure date
    pub departure_date: NaiveDate,
    /// Carrier code of the first segment
    pub carrier: String,
    /// Flight number of the first segment
    pub flight_number: String,
    /// Departure time of the first segment
    pub departure_at: NaiveDateTime,
    /// Arrival time of the last segment
    pub arrival_at: NaiveDateTime,
}

/// Looks up one-way flight offers between two cities
pub struct FlightSearchTool {
    client: Arc<AmadeusClient>,
    currency: String,
}

impl FlightSearchTool {
    /// Create the tool around a shared Amadeus client
    pub fn new(client: Arc<AmadeusClient>, currency: &str) -> Self {
        Self {
            client,
            currency: currency.to_string(),
        }
    }

    /// Search offers for a typed input
    ///
    /// Both cities are resolved before any request is made, so an unknown
    /// city never reaches the network. Offers keep provider order.
    ///
    /// # Errors
    /// * `ToolError::UnknownLocation` for either city
    /// * `ToolError::InvalidArguments` if `adults` is zero
    /// * Token and provider errors from the Amadeus client
    pub async fn search(&self, input: &FlightSearchInput) -> Result<Vec<FlightOffer>, ToolError> {
        let origin = resolve_city_code(&input.origin_city)?;
        let destination = resolve_city_code(&input.destination_city)?;
        if input.adults == 0 {
            return Err(ToolError::invalid_arguments(
                TOOL_FLIGHT_SEARCH,
                "adults must be at least 1",
            ));
        }

        let query = FlightOfferQuery {
            origin_code: origin,
            destination_code: destination,
            departure_date: input.departure_date,
            adults: input.adults,
            currency: &self.currency,
        };
        let offers = self.client.flight_offers(&query).await?;

        tracing::info!(
            tool = TOOL_FLIGHT_SEARCH,
            origin = origin,
            destination = destination,
            offer_count = offers.len(),
            "Flight search completed"
        );

        offers
            .into_iter()
            .map(|offer| normalize_offer(offer, &query))
            .collect()
    }
}

fn normalize_offer(
    offer: FlightOfferData,
    query: &FlightOfferQuery<'_>,
) -> Result<FlightOffer, ToolError> {
    let segments = offer
        .itineraries
        .first()
        .map(|itinerary| itinerary.segments.as_slice())
        .unwrap_or_default();
    let (first, last) = match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(ToolError::provider(
                crate::tools::amadeus::PROVIDER,
                None,
                "flight offer has no segments",
            ))
        }
    };

    Ok(FlightOffer {
        price: offer.price.total,
        currency: offer.price.currency,
        origin: query.origin_code.to_string(),
        destination: query.destination_code.to_string(),
        departure_date: query.departure_date,
        carrier: first.carrier_code.clone(),
        flight_number: first.number.clone(),
        departure_at: first.departure.at,
        arrival_at: last.arrival.at,
    })
}

#[async_trait]
impl Tool for FlightSearchTool {
    fn name(&self) -> &str {
        TOOL_FLIGHT_SEARCH
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_FLIGHT_SEARCH.to_string(),
            description: format!(
                "Search one-way flight offers between two cities on a date. Returns up to 10 offers \
                 (price in {}, carrier, flight number, departure and arrival times). Call it once \
                 per direction for a round trip.",
                self.currency
            ),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "origin_city": {
                        "type": "string",
                        "description": "Departure city display name, e.g. 인천 or Incheon",
                        "enum": known_city_names()
                    },
                    "destination_city": {
                        "type": "string",
                        "description": "Arrival city display name, e.g. 오사카 or Osaka",
                        "enum": known_city_names()
                    },
                    "departure_date": {
                        "type": "string",
                        "description": "Departure date in YYYY-MM-DD format"
                    },
                    "adults": {
                        "type": "integer",
                        "description": "Number of adult travelers (default: 1)"
                    }
                },
                "required": ["origin_city", "destination_city", "departure_date"]
            }),
        }
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let input: FlightSearchInput = parse_arguments(TOOL_FLIGHT_SEARCH, arguments)?;
        let offers = self.search(&input).await?;
        to_output(TOOL_FLIGHT_SEARCH, &offers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::amadeus::test_support::client_for;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";

    fn tool_for(server: &Server) -> FlightSearchTool {
        FlightSearchTool::new(Arc::new(client_for(&server.url())), "KRW")
    }

    fn offer_json(price: &str, carrier: &str, number: &str) -> serde_json::Value {
        json!({
            "price": {"total": price, "currency": "KRW"},
            "itineraries": [{
                "segments": [
                    {
                        "carrierCode": carrier,
                        "number": number,
                        "departure": {"iataCode": "ICN", "at": "2025-04-25T08:00:00"},
                        "arrival": {"iataCode": "NRT", "at": "2025-04-25T10:10:00"}
                    },
                    {
                        "carrierCode": carrier,
                        "number": "900",
                        "departure": {"iataCode": "NRT", "at": "2025-04-25T12:00:00"},
                        "arrival": {"iataCode": "KIX", "at": "2025-04-25T13:20:00"}
                    }
                ]
            }]
        })
    }

    #[tokio::test]
    async fn test_offers_are_normalized_in_provider_order() {
        let mut server = Server::new_async().await;
        let body = json!({
            "data": [
                offer_json("350000.00", "KE", "723"),
                offer_json("210000.00", "7C", "1301"),
            ]
        });
        let mock = server
            .mock("GET", FLIGHT_OFFERS_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("originLocationCode".into(), "ICN".into()),
                Matcher::UrlEncoded("destinationLocationCode".into(), "OSA".into()),
                Matcher::UrlEncoded("departureDate".into(), "2025-04-25".into()),
                Matcher::UrlEncoded("adults".into(), "1".into()),
                Matcher::UrlEncoded("currencyCode".into(), "KRW".into()),
                Matcher::UrlEncoded("max".into(), "10".into()),
            ]))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let output = tool_for(&server)
            .call(json!({
                "origin_city": "인천",
                "destination_city": "오사카",
                "departure_date": "2025-04-25"
            }))
            .await
            .unwrap();
        mock.assert_async().await;

        let offers: Vec<FlightOffer> = serde_json::from_value(output).unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].price, "350000.00");
        assert_eq!(offers[0].carrier, "KE");
        assert_eq!(offers[0].flight_number, "723");
        assert_eq!(offers[0].origin, "ICN");
        assert_eq!(offers[0].destination, "OSA");
        assert_eq!(offers[0].departure_at.to_string(), "2025-04-25 08:00:00");
        assert_eq!(offers[0].arrival_at.to_string(), "2025-04-25 13:20:00");
        assert_eq!(offers[1].carrier, "7C");
    }

    #[tokio::test]
    async fn test_zero_offers_is_empty_list() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", FLIGHT_OFFERS_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"meta": {"count": 0}, "data": []}"#)
            .create_async()
            .await;

        let output = tool_for(&server)
            .call(json!({
                "origin_city": "Incheon",
                "destination_city": "Osaka",
                "departure_date": "2025-04-25"
            }))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(output, json!([]));
    }

    #[tokio::test]
    async fn test_unknown_city_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", FLIGHT_OFFERS_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = tool_for(&server)
            .call(json!({
                "origin_city": "인천",
                "destination_city": "Atlantis",
                "departure_date": "2025-04-25"
            }))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ToolError::UnknownLocation(ref name) if name == "Atlantis"));
    }

    #[tokio::test]
    async fn test_error_status_is_provider_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", FLIGHT_OFFERS_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"errors": [{"code": 141, "title": "SYSTEM ERROR HAS OCCURRED"}]}"#)
            .create_async()
            .await;

        let err = tool_for(&server)
            .call(json!({
                "origin_city": "인천",
                "destination_city": "오사카",
                "departure_date": "2025-04-25"
            }))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ToolError::Provider { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_malformed_date_is_invalid_arguments() {
        let server = Server::new_async().await;
        let err = tool_for(&server)
            .call(json!({
                "origin_city": "인천",
                "destination_city": "오사카",
                "departure_date": "25/04/2025"
            }))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_definition_lists_accepted_city_names() {
        let server = Server::new_async().await;
        let definition = tool_for(&server).definition();

        for field in ["origin_city", "destination_city"] {
            let accepted = definition.parameters["properties"][field]["enum"]
                .as_array()
                .unwrap();
            assert_eq!(accepted.len(), known_city_names().len());
            assert!(accepted.contains(&json!("오사카")));
            assert!(accepted.contains(&json!("Osaka")));
        }
    }
}
