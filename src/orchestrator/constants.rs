//! Orchestrator constants
//!
//! Tool identifiers shared by the tool registry and the task definitions.

/// One-way flight offer search
pub const TOOL_FLIGHT_SEARCH: &str = "flight_search";

/// Hotel availability search
pub const TOOL_HOTEL_SEARCH: &str = "hotel_search";

/// Tourist attractions near a place
pub const TOOL_NEARBY_ATTRACTIONS: &str = "nearby_attractions";

/// Restaurants near a place
pub const TOOL_NEARBY_RESTAURANTS: &str = "nearby_restaurants";

/// Currency conversion
pub const TOOL_CURRENCY_CONVERT: &str = "currency_convert";

/// Default cap on engine turns within one stage
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;

/// Sample trip request used when none is supplied
pub const SAMPLE_TRIP_REQUEST: &str = "2025년 4월 25일부터 27일까지 인천을 출발해서 오사카로 여행을 다녀오려고 합니다. \
항공편, 숙소, 현지 맛집, 가볼만한 곳까지 포함해서 여행 일정을 상세히 만들어주세요. \
예산은 총 80만 원 이내로 잡고 있어요. \
혼자 가는 여행이라 너무 비싸지 않으면서 가성비 좋은 곳들로 부탁드려요.";
