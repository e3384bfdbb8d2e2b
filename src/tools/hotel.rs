//! Hotel search tool
//!
//! Lists hotels in a city, then fetches the best offer of each candidate
//! one at a time. A candidate whose offer lookup fails is dropped with a
//! warning; credential and authentication failures still abort the call.

use crate::orchestrator::constants::TOOL_HOTEL_SEARCH;
use crate::tools::amadeus::AmadeusClient;
use crate::tools::error::ToolError;
use crate::tools::locations::{known_city_names, resolve_city_code};
use crate::tools::{parse_arguments, to_output, Tool, ToolDefinition};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of candidate hotels considered per search
pub const DEFAULT_MAX_HOTELS: usize = 10;

fn default_adults() -> u32 {
    1
}

fn default_max_hotels() -> usize {
    DEFAULT_MAX_HOTELS
}

/// Arguments accepted by `hotel_search`
#[derive(Debug, Deserialize)]
pub struct HotelSearchInput {
    /// City display name
    pub city_name: String,
    /// Check-in date (YYYY-MM-DD)
    pub check_in_date: NaiveDate,
    /// Check-out date (YYYY-MM-DD)
    pub check_out_date: NaiveDate,
    /// Number of adult guests
    #[serde(default = "default_adults")]
    pub adults: u32,
    /// Maximum number of candidate hotels to look up
    #[serde(default = "default_max_hotels")]
    pub max_hotels: usize,
}

/// Best available offer of one hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelAvailability {
    /// Hotel display name
    pub hotel_name: String,
    /// Check-in date
    pub check_in: NaiveDate,
    /// Check-out date
    pub check_out: NaiveDate,
    /// Room description, when the provider has one
    pub room_description: Option<String>,
    /// Total price of the stay as reported by the provider
    pub total_price: String,
    /// Currency of `total_price`
    pub currency: String,
}

/// Looks up available hotels in a city for a stay
pub struct HotelSearchTool {
    client: Arc<AmadeusClient>,
}

impl HotelSearchTool {
    /// Create the tool around a shared Amadeus client
    pub fn new(client: Arc<AmadeusClient>) -> Self {
        Self { client }
    }

    /// Search availability for a typed input
    ///
    /// Only the first `max_hotels` candidates of the by-city list are
    /// considered. Candidates without an offer are skipped, not replaced.
    pub async fn search(
        &self,
        input: &HotelSearchInput,
    ) -> Result<Vec<HotelAvailability>, ToolError> {
        let city_code = resolve_city_code(&input.city_name)?;
        validate(input)?;

        let candidates = self.client.hotels_by_city(city_code).await?;
        tracing::debug!(
            tool = TOOL_HOTEL_SEARCH,
            city_code = city_code,
            candidate_count = candidates.len(),
            "Fetched hotel candidates"
        );

        let mut available = Vec::new();
        for candidate in candidates.iter().take(input.max_hotels) {
            let offer = match self
                .client
                .hotel_offer(
                    &candidate.hotel_id,
                    input.check_in_date,
                    input.check_out_date,
                    input.adults,
                )
                .await
            {
                Ok(Some(offer)) => offer,
                Ok(None) => continue,
                Err(e) if e.is_provider_failure() => {
                    tracing::warn!(
                        tool = TOOL_HOTEL_SEARCH,
                        hotel_id = %candidate.hotel_id,
                        error = %e,
                        "Skipping hotel whose offer lookup failed"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            let hotel_name = offer.hotel.name;
            // hotel_offer only returns offers with at least one entry
            if let Some(best) = offer.offers.into_iter().next() {
                available.push(HotelAvailability {
                    hotel_name,
                    check_in: input.check_in_date,
                    check_out: input.check_out_date,
                    room_description: best
                        .room
                        .and_then(|room| room.description)
                        .map(|description| description.text),
                    total_price: best.price.total,
                    currency: best.price.currency,
                });
            }
        }

        tracing::info!(
            tool = TOOL_HOTEL_SEARCH,
            city_code = city_code,
            available_count = available.len(),
            "Hotel search completed"
        );
        Ok(available)
    }
}

fn validate(input: &HotelSearchInput) -> Result<(), ToolError> {
    if input.check_out_date <= input.check_in_date {
        return Err(ToolError::invalid_arguments(
            TOOL_HOTEL_SEARCH,
            format!(
                "check_out_date {} must be after check_in_date {}",
                input.check_out_date, input.check_in_date
            ),
        ));
    }
    if input.adults == 0 {
        return Err(ToolError::invalid_arguments(
            TOOL_HOTEL_SEARCH,
            "adults must be at least 1",
        ));
    }
    if input.max_hotels == 0 {
        return Err(ToolError::invalid_arguments(
            TOOL_HOTEL_SEARCH,
            "max_hotels must be at least 1",
        ));
    }
    Ok(())
}

#[async_trait]
impl Tool for HotelSearchTool {
    fn name(&self) -> &str {
        TOOL_HOTEL_SEARCH
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_HOTEL_SEARCH.to_string(),
            description: "Find hotels with availability in a city for a stay. Returns hotel name, \
                          room description and total price of the best offer for each hotel."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "city_name": {
                        "type": "string",
                        "description": "City display name, e.g. 오사카 or Osaka",
                        "enum": known_city_names()
                    },
                    "check_in_date": {
                        "type": "string",
                        "description": "Check-in date in YYYY-MM-DD format"
                    },
                    "check_out_date": {
                        "type": "string",
                        "description": "Check-out date in YYYY-MM-DD format"
                    },
                    "adults": {
                        "type": "integer",
                        "description": "Number of adult guests (default: 1)"
                    },
                    "max_hotels": {
                        "type": "integer",
                        "description": "Maximum number of hotels to check (default: 10)"
                    }
                },
                "required": ["city_name", "check_in_date", "check_out_date"]
            }),
        }
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let input: HotelSearchInput = parse_arguments(TOOL_HOTEL_SEARCH, arguments)?;
        let hotels = self.search(&input).await?;
        to_output(TOOL_HOTEL_SEARCH, &hotels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::amadeus::test_support::client_for;
    use mockito::{Matcher, Mock, Server};
    use serde_json::json;

    const HOTELS_BY_CITY_PATH: &str = "/v1/reference-data/locations/hotels/by-city";
    const HOTEL_OFFERS_PATH: &str = "/v3/shopping/hotel-offers";

    fn tool_for(server: &Server) -> HotelSearchTool {
        HotelSearchTool::new(Arc::new(client_for(&server.url())))
    }

    async fn mock_city(server: &mut Server, hotel_ids: &[&str]) -> Mock {
        let data: Vec<_> = hotel_ids
            .iter()
            .map(|id| json!({"hotelId": id, "name": format!("Hotel {}", id)}))
            .collect();
        server
            .mock("GET", HOTELS_BY_CITY_PATH)
            .match_query(Matcher::UrlEncoded("cityCode".into(), "OSA".into()))
            .with_status(200)
            .with_body(json!({ "data": data }).to_string())
            .create_async()
            .await
    }

    async fn mock_offer(server: &mut Server, hotel_id: &str, name: &str, price: &str) -> Mock {
        let body = json!({
            "data": [{
                "hotel": {"hotelId": hotel_id, "name": name},
                "offers": [{
                    "room": {"description": {"text": "Standard double room"}},
                    "price": {"total": price, "currency": "JPY"}
                }]
            }]
        });
        server
            .mock("GET", HOTEL_OFFERS_PATH)
            .match_query(Matcher::UrlEncoded("hotelIds".into(), hotel_id.into()))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await
    }

    fn stay() -> serde_json::Value {
        json!({
            "city_name": "오사카",
            "check_in_date": "2025-04-25",
            "check_out_date": "2025-04-27"
        })
    }

    #[tokio::test]
    async fn test_failed_offer_lookup_is_dropped() {
        let mut server = Server::new_async().await;
        let city = mock_city(&mut server, &["H1", "H2", "H3"]).await;
        let first = mock_offer(&mut server, "H1", "Hotel One", "24000.00").await;
        let second = server
            .mock("GET", HOTEL_OFFERS_PATH)
            .match_query(Matcher::UrlEncoded("hotelIds".into(), "H2".into()))
            .with_status(400)
            .with_body(r#"{"errors": [{"code": 3664, "title": "NO ROOMS AVAILABLE AT REQUESTED PROPERTY"}]}"#)
            .create_async()
            .await;
        let third = mock_offer(&mut server, "H3", "Hotel Three", "31000.00").await;

        let output = tool_for(&server).call(stay()).await.unwrap();

        city.assert_async().await;
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;

        let hotels: Vec<HotelAvailability> = serde_json::from_value(output).unwrap();
        let names: Vec<&str> = hotels.iter().map(|h| h.hotel_name.as_str()).collect();
        assert_eq!(names, vec!["Hotel One", "Hotel Three"]);
        assert_eq!(hotels[0].total_price, "24000.00");
        assert_eq!(hotels[0].currency, "JPY");
        assert_eq!(
            hotels[0].room_description.as_deref(),
            Some("Standard double room")
        );
        assert_eq!(hotels[1].check_in.to_string(), "2025-04-25");
        assert_eq!(hotels[1].check_out.to_string(), "2025-04-27");
    }

    #[tokio::test]
    async fn test_only_first_candidates_are_considered() {
        let mut server = Server::new_async().await;
        let city = mock_city(&mut server, &["H1", "H2", "H3"]).await;
        let first = server
            .mock("GET", HOTEL_OFFERS_PATH)
            .match_query(Matcher::UrlEncoded("hotelIds".into(), "H1".into()))
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;
        let second = mock_offer(&mut server, "H2", "Hotel Two", "18000.00").await;
        let third = server
            .mock("GET", HOTEL_OFFERS_PATH)
            .match_query(Matcher::UrlEncoded("hotelIds".into(), "H3".into()))
            .expect(0)
            .create_async()
            .await;

        let mut arguments = stay();
        arguments["max_hotels"] = json!(2);
        let output = tool_for(&server).call(arguments).await.unwrap();

        city.assert_async().await;
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;

        let hotels: Vec<HotelAvailability> = serde_json::from_value(output).unwrap();
        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].hotel_name, "Hotel Two");
    }

    #[tokio::test]
    async fn test_city_list_failure_aborts() {
        let mut server = Server::new_async().await;
        let city = server
            .mock("GET", HOTELS_BY_CITY_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = tool_for(&server).call(stay()).await.unwrap_err();

        city.assert_async().await;
        assert!(matches!(err, ToolError::Provider { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_check_out_must_follow_check_in() {
        let mut server = Server::new_async().await;
        let city = server
            .mock("GET", HOTELS_BY_CITY_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = tool_for(&server)
            .call(json!({
                "city_name": "오사카",
                "check_in_date": "2025-04-27",
                "check_out_date": "2025-04-27"
            }))
            .await
            .unwrap_err();

        city.assert_async().await;
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_unknown_city_fails_before_network() {
        let mut server = Server::new_async().await;
        let city = server
            .mock("GET", HOTELS_BY_CITY_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut arguments = stay();
        arguments["city_name"] = json!("Gotham");
        let err = tool_for(&server).call(arguments).await.unwrap_err();

        city.assert_async().await;
        assert!(matches!(err, ToolError::UnknownLocation(_)));
    }

    #[tokio::test]
    async fn test_definition_lists_accepted_city_names() {
        let server = Server::new_async().await;
        let definition = tool_for(&server).definition();

        let accepted = definition.parameters["properties"]["city_name"]["enum"]
            .as_array()
            .unwrap();
        assert!(accepted.contains(&json!("도쿄")));
        assert!(accepted.contains(&json!("Tokyo")));
        assert!(accepted.iter().all(|name| name
            .as_str()
            .is_some_and(|name| resolve_city_code(name).is_ok())));
    }
}
