//! Google Places client and nearby place tools
//!
//! A nearby lookup runs three kinds of request in order: a text search to
//! resolve the place name to coordinates, a nearby search of one fixed
//! category around them, then a details request per candidate.
//!
//! Google reports most failures with HTTP 200 and a non-`OK` `status`
//! field, so every response is checked twice.

use crate::orchestrator::constants::{TOOL_NEARBY_ATTRACTIONS, TOOL_NEARBY_RESTAURANTS};
use crate::tools::error::ToolError;
use crate::tools::http;
use crate::tools::{parse_arguments, to_output, Tool, ToolDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Provider name used in errors and logs
pub const PROVIDER: &str = "Google Places";

/// Default Google Places API base URL
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Maximum number of nearby places returned per lookup
pub const MAX_NEARBY_PLACES: usize = 5;

/// Maximum number of reviews kept per place
pub const MAX_REVIEWS: usize = 3;

const DETAIL_FIELDS: &str =
    "name,rating,formatted_address,formatted_phone_number,opening_hours,website,reviews";

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Place category searched by a nearby tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceCategory {
    /// `tourist_attraction`
    TouristAttraction,
    /// `restaurant`
    Restaurant,
}

impl PlaceCategory {
    /// Google place type sent with nearby searches
    pub fn place_type(self) -> &'static str {
        match self {
            PlaceCategory::TouristAttraction => "tourist_attraction",
            PlaceCategory::Restaurant => "restaurant",
        }
    }

    /// Name of the tool searching this category
    pub fn tool_name(self) -> &'static str {
        match self {
            PlaceCategory::TouristAttraction => TOOL_NEARBY_ATTRACTIONS,
            PlaceCategory::Restaurant => TOOL_NEARBY_RESTAURANTS,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            PlaceCategory::TouristAttraction => "tourist attractions",
            PlaceCategory::Restaurant => "restaurants",
        }
    }
}

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

#[derive(Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    place_id: Option<String>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Geometry {
    location: Coordinates,
}

#[derive(Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<DetailsResult>,
}

#[derive(Deserialize)]
struct DetailsResult {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    formatted_phone_number: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    opening_hours: Option<OpeningHours>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    reviews: Vec<ReviewResult>,
}

#[derive(Deserialize)]
struct OpeningHours {
    #[serde(default)]
    weekday_text: Vec<String>,
}

#[derive(Deserialize)]
struct ReviewResult {
    #[serde(default)]
    text: String,
    #[serde(default)]
    rating: Option<f64>,
}

/// Normalized details of one place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    /// Display name
    pub name: String,
    /// Formatted address
    pub address: Option<String>,
    /// Formatted phone number
    pub phone: Option<String>,
    /// Website URL
    pub website: Option<String>,
    /// Opening hours, one line per weekday
    pub opening_hours: Vec<String>,
    /// Average rating
    pub rating: Option<f64>,
    /// Up to three reviews
    pub reviews: Vec<PlaceReview>,
}

/// A single place review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceReview {
    /// Review text
    pub text: String,
    /// Rating given by the reviewer
    pub rating: Option<f64>,
}

impl From<DetailsResult> for PlaceDetails {
    fn from(result: DetailsResult) -> Self {
        Self {
            name: result.name.unwrap_or_default(),
            address: result.formatted_address,
            phone: result.formatted_phone_number,
            website: result.website,
            opening_hours: result
                .opening_hours
                .map(|hours| hours.weekday_text)
                .unwrap_or_default(),
            rating: result.rating,
            reviews: result
                .reviews
                .into_iter()
                .take(MAX_REVIEWS)
                .map(|review| PlaceReview {
                    text: review.text,
                    rating: review.rating,
                })
                .collect(),
        }
    }
}

fn status_error(endpoint: &str, status: &str, message: Option<String>) -> ToolError {
    let detail = match message {
        Some(message) => format!("{} returned status {}: {}", endpoint, status, message),
        None => format!("{} returned status {}", endpoint, status),
    };
    ToolError::provider(PROVIDER, None, detail)
}

/// Google Places API client
pub struct PlacesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    language: String,
}

impl PlacesClient {
    /// Create a client
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client
    /// * `base_url` - Places API base URL (without the endpoint segment)
    /// * `api_key` - `GOOGLE_API_KEY`, checked when a request is made
    /// * `language` - Language code results are localized to
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
        language: &str,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            language: language.to_string(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ToolError::MissingCredential("GOOGLE_API_KEY"))?;
        let url = format!("{}/{}/json", self.base_url, endpoint);

        tracing::debug!(url = %url, "Calling Google Places API");

        let request = self
            .http
            .get(&url)
            .query(params)
            .query(&[("language", self.language.as_str()), ("key", api_key)]);
        let response = http::send(PROVIDER, request).await?;
        http::read_json(PROVIDER, response).await
    }

    /// Resolve a free-text place name to coordinates (first result wins)
    pub async fn locate(&self, place_name: &str) -> Result<Coordinates, ToolError> {
        let response: SearchResponse = self
            .get("textsearch", &[("query", place_name.to_string())])
            .await?;
        if response.status != STATUS_OK {
            return Err(status_error(
                "textsearch",
                &response.status,
                response.error_message,
            ));
        }
        response
            .results
            .into_iter()
            .next()
            .and_then(|result| result.geometry)
            .map(|geometry| geometry.location)
            .ok_or_else(|| {
                ToolError::provider(
                    PROVIDER,
                    None,
                    format!("textsearch returned no location for '{}'", place_name),
                )
            })
    }

    /// Place ids of up to [`MAX_NEARBY_PLACES`] places of a category
    ///
    /// `ZERO_RESULTS` yields an empty list.
    pub async fn nearby(
        &self,
        location: Coordinates,
        radius: u32,
        category: PlaceCategory,
    ) -> Result<Vec<String>, ToolError> {
        let params = [
            ("location", format!("{},{}", location.lat, location.lng)),
            ("radius", radius.to_string()),
            ("type", category.place_type().to_string()),
        ];
        let response: SearchResponse = self.get("nearbysearch", &params).await?;
        match response.status.as_str() {
            STATUS_OK => Ok(response
                .results
                .into_iter()
                .filter_map(|result| result.place_id)
                .take(MAX_NEARBY_PLACES)
                .collect()),
            STATUS_ZERO_RESULTS => Ok(Vec::new()),
            other => Err(status_error("nearbysearch", other, response.error_message)),
        }
    }

    /// Fetch details of one place
    pub async fn details(&self, place_id: &str) -> Result<PlaceDetails, ToolError> {
        let params = [
            ("place_id", place_id.to_string()),
            ("fields", DETAIL_FIELDS.to_string()),
        ];
        let response: DetailsResponse = self.get("details", &params).await?;
        if response.status != STATUS_OK {
            return Err(status_error(
                "details",
                &response.status,
                response.error_message,
            ));
        }
        response.result.map(PlaceDetails::from).ok_or_else(|| {
            ToolError::provider(PROVIDER, None, "details response has no result")
        })
    }
}

fn default_radius() -> u32 {
    1000
}

/// Arguments accepted by the nearby place tools
#[derive(Debug, Deserialize)]
pub struct NearbyPlacesInput {
    /// Free-text place name to search around
    pub place_name: String,
    /// Search radius in meters
    #[serde(default = "default_radius")]
    pub radius: u32,
}

/// Recommends places of one fixed category near a named place
pub struct NearbyPlacesTool {
    client: Arc<PlacesClient>,
    category: PlaceCategory,
}

impl NearbyPlacesTool {
    /// Create a tool for one category around a shared client
    pub fn new(client: Arc<PlacesClient>, category: PlaceCategory) -> Self {
        Self { client, category }
    }

    /// Look up nearby places and their details
    ///
    /// A place whose details request fails is dropped with a warning.
    pub async fn search(&self, input: &NearbyPlacesInput) -> Result<Vec<PlaceDetails>, ToolError> {
        let tool = self.category.tool_name();
        if input.place_name.trim().is_empty() {
            return Err(ToolError::invalid_arguments(tool, "place_name must not be empty"));
        }
        if input.radius == 0 {
            return Err(ToolError::invalid_arguments(tool, "radius must be positive"));
        }

        let location = self.client.locate(&input.place_name).await?;
        let place_ids = self
            .client
            .nearby(location, input.radius, self.category)
            .await?;

        let mut places = Vec::with_capacity(place_ids.len());
        for place_id in &place_ids {
            match self.client.details(place_id).await {
                Ok(details) => places.push(details),
                Err(e) if e.is_provider_failure() => {
                    tracing::warn!(
                        tool = tool,
                        place_id = %place_id,
                        error = %e,
                        "Skipping place whose details lookup failed"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            tool = tool,
            candidate_count = place_ids.len(),
            place_count = places.len(),
            "Nearby place search completed"
        );
        Ok(places)
    }
}

#[async_trait]
impl Tool for NearbyPlacesTool {
    fn name(&self) -> &str {
        self.category.tool_name()
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.category.tool_name().to_string(),
            description: format!(
                "Recommend up to {} {} near a named place, with address, phone, website, \
                 opening hours, rating and a few reviews.",
                MAX_NEARBY_PLACES,
                self.category.noun()
            ),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "place_name": {
                        "type": "string",
                        "description": "Place or area to search around, e.g. 도톤보리 or Osaka Castle"
                    },
                    "radius": {
                        "type": "integer",
                        "description": "Search radius in meters (default: 1000)"
                    }
                },
                "required": ["place_name"]
            }),
        }
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let tool = self.category.tool_name();
        let input: NearbyPlacesInput = parse_arguments(tool, arguments)?;
        let places = self.search(&input).await?;
        to_output(tool, &places)
    }
}
