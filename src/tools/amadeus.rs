//! Amadeus self-service API client
//!
//! Shared by the flight and hotel tools. Owns the provider's token cache,
//! so both tools reuse one bearer token.

use crate::tools::error::ToolError;
use crate::tools::http;
use crate::tools::token_cache::{ClientCredentials, TokenCache};
use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Provider name used in errors and logs
pub const PROVIDER: &str = "Amadeus";

/// Default Amadeus API base URL (test environment)
pub const DEFAULT_BASE_URL: &str = "https://test.api.amadeus.com";

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";
const HOTELS_BY_CITY_PATH: &str = "/v1/reference-data/locations/hotels/by-city";
const HOTEL_OFFERS_PATH: &str = "/v3/shopping/hotel-offers";

/// Maximum number of flight offers requested per search
pub const MAX_FLIGHT_OFFERS: u32 = 10;

#[derive(Deserialize)]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Price block shared by flight and hotel offers
#[derive(Debug, Deserialize)]
pub struct OfferPrice {
    /// Total price as the decimal string the provider returned
    pub total: String,
    /// ISO currency code
    pub currency: String,
}

/// One flight offer as returned by the flight-offers endpoint
#[derive(Debug, Deserialize)]
pub struct FlightOfferData {
    /// Offer price
    pub price: OfferPrice,
    /// Itineraries (the first is the outbound one)
    pub itineraries: Vec<Itinerary>,
}

/// Itinerary of a flight offer
#[derive(Debug, Deserialize)]
pub struct Itinerary {
    /// Flight segments in travel order
    pub segments: Vec<Segment>,
}

/// A single flight segment
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// IATA carrier code
    pub carrier_code: String,
    /// Flight number (without carrier prefix)
    pub number: String,
    /// Departure endpoint
    pub departure: SegmentEndpoint,
    /// Arrival endpoint
    pub arrival: SegmentEndpoint,
}

/// Departure or arrival of a segment
#[derive(Debug, Deserialize)]
pub struct SegmentEndpoint {
    /// Local date-time at the airport
    pub at: NaiveDateTime,
}

/// Entry of the hotels-by-city list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelReference {
    /// Amadeus hotel id
    pub hotel_id: String,
}

/// Best offer for one hotel
#[derive(Debug, Deserialize)]
pub struct HotelOfferData {
    /// Hotel information
    pub hotel: HotelInfo,
    /// Available offers (the first is the best one)
    #[serde(default)]
    pub offers: Vec<HotelOffer>,
}

/// Hotel information attached to an offer
#[derive(Debug, Deserialize)]
pub struct HotelInfo {
    /// Hotel display name
    pub name: String,
}

/// A single room offer
#[derive(Debug, Deserialize)]
pub struct HotelOffer {
    /// Room details
    #[serde(default)]
    pub room: Option<Room>,
    /// Offer price
    pub price: OfferPrice,
}

/// Room details of an offer
#[derive(Debug, Deserialize)]
pub struct Room {
    /// Free-text room description
    #[serde(default)]
    pub description: Option<RoomDescription>,
}

/// Room description wrapper
#[derive(Debug, Deserialize)]
pub struct RoomDescription {
    /// Description text
    pub text: String,
}

/// Query for the flight-offers endpoint
#[derive(Debug, Clone)]
pub struct FlightOfferQuery<'a> {
    /// Origin location code
    pub origin_code: &'a str,
    /// Destination location code
    pub destination_code: &'a str,
    /// Departure date
    pub departure_date: NaiveDate,
    /// Number of adult travelers
    pub adults: u32,
    /// Currency offers are priced in
    pub currency: &'a str,
}

/// Amadeus API client
pub struct AmadeusClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenCache,
}

impl AmadeusClient {
    /// Create a client with an empty token cache
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        credentials: Result<ClientCredentials, &'static str>,
        token_safety_margin: Duration,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let tokens = TokenCache::new(
            PROVIDER,
            format!("{}{}", base_url, TOKEN_PATH),
            credentials,
            token_safety_margin,
        );
        Self::with_token_cache(http, &base_url, tokens)
    }

    /// Create a client around an existing token cache
    pub fn with_token_cache(http: reqwest::Client, base_url: &str, tokens: TokenCache) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ToolError> {
        let token = self.tokens.get_token(&self.http).await?;
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(url = %url, "Calling Amadeus API");

        let request = self.http.get(&url).bearer_auth(token).query(query);
        let response = http::send(PROVIDER, request).await?;
        http::read_json(PROVIDER, response).await
    }

    /// Search flight offers, in provider order
    ///
    /// Returns an empty list when the provider reports no offers.
    pub async fn flight_offers(
        &self,
        query: &FlightOfferQuery<'_>,
    ) -> Result<Vec<FlightOfferData>, ToolError> {
        let params = [
            ("originLocationCode", query.origin_code.to_string()),
            ("destinationLocationCode", query.destination_code.to_string()),
            ("departureDate", query.departure_date.format("%Y-%m-%d").to_string()),
            ("adults", query.adults.to_string()),
            ("currencyCode", query.currency.to_string()),
            ("max", MAX_FLIGHT_OFFERS.to_string()),
        ];
        let envelope: DataEnvelope<FlightOfferData> = self.get(FLIGHT_OFFERS_PATH, &params).await?;
        Ok(envelope.data)
    }

    /// List hotels located in a city
    pub async fn hotels_by_city(&self, city_code: &str) -> Result<Vec<HotelReference>, ToolError> {
        let params = [("cityCode", city_code.to_string())];
        let envelope: DataEnvelope<HotelReference> =
            self.get(HOTELS_BY_CITY_PATH, &params).await?;
        Ok(envelope.data)
    }

    /// Fetch the best offer for a single hotel
    ///
    /// Returns `Ok(None)` when the hotel has no offer for the stay.
    pub async fn hotel_offer(
        &self,
        hotel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        adults: u32,
    ) -> Result<Option<HotelOfferData>, ToolError> {
        let params = [
            ("hotelIds", hotel_id.to_string()),
            ("checkInDate", check_in.format("%Y-%m-%d").to_string()),
            ("checkOutDate", check_out.format("%Y-%m-%d").to_string()),
            ("adults", adults.to_string()),
        ];
        let envelope: DataEnvelope<HotelOfferData> = self.get(HOTEL_OFFERS_PATH, &params).await?;
        Ok(envelope
            .data
            .into_iter()
            .next()
            .filter(|offer| !offer.offers.is_empty()))
    }
}
