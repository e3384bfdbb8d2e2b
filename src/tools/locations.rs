//! City code resolution
//!
//! Maps human-entered city display names to IATA city/airport codes.
//! This is the only copy of the table; flight and hotel lookups both
//! resolve through [`resolve_city_code`].
//!
//! Lookup is exact-match only. Each accepted spelling (the Korean display
//! name and the English display name) is listed as its own key.

use crate::tools::error::ToolError;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// (Korean display name, English display name, code)
const CITY_CODES: &[(&str, &str, &str)] = &[
    ("서울", "Seoul", "SEL"),
    ("부산", "Busan", "PUS"),
    ("제주", "Jeju", "CJU"),
    ("대구", "Daegu", "TAE"),
    ("인천", "Incheon", "ICN"),
    ("오사카", "Osaka", "OSA"),
    ("도쿄", "Tokyo", "TYO"),
    ("후쿠오카", "Fukuoka", "FUK"),
    ("삿포로", "Sapporo", "SPK"),
    ("나고야", "Nagoya", "NGO"),
    ("오키나와", "Okinawa", "OKA"),
    ("교토", "Kyoto", "UKY"),
    ("요코하마", "Yokohama", "YOK"),
    ("히로시마", "Hiroshima", "HIJ"),
    ("베이징", "Beijing", "BJS"),
    ("상하이", "Shanghai", "SHA"),
    ("광저우", "Guangzhou", "CAN"),
    ("선전", "Shenzhen", "SZX"),
    ("칭다오", "Qingdao", "TAO"),
    ("홍콩", "Hong Kong", "HKG"),
    ("마카오", "Macau", "MFM"),
    ("시안", "Xi'an", "SIA"),
    ("타이베이", "Taipei", "TPE"),
    ("가오슝", "Kaohsiung", "KHH"),
    ("방콕", "Bangkok", "BKK"),
    ("푸켓", "Phuket", "HKT"),
    ("치앙마이", "Chiang Mai", "CNX"),
    ("하노이", "Hanoi", "HAN"),
    ("호치민", "Ho Chi Minh City", "SGN"),
    ("다낭", "Da Nang", "DAD"),
    ("나트랑", "Nha Trang", "NHA"),
    ("마닐라", "Manila", "MNL"),
    ("세부", "Cebu", "CEB"),
    ("보라카이", "Boracay", "MPH"),
    ("싱가포르", "Singapore", "SIN"),
    ("쿠알라룸푸르", "Kuala Lumpur", "KUL"),
    ("코타키나발루", "Kota Kinabalu", "BKI"),
    ("페낭", "Penang", "PEN"),
    ("자카르타", "Jakarta", "JKT"),
    ("발리", "Bali", "DPS"),
    ("족자카르타", "Yogyakarta", "JOG"),
    ("델리", "Delhi", "DEL"),
    ("뭄바이", "Mumbai", "BOM"),
    ("방갈로르", "Bangalore", "BLR"),
];

static CITY_CODE_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut table = HashMap::with_capacity(CITY_CODES.len() * 2);
    for (korean, english, code) in CITY_CODES {
        table.insert(*korean, *code);
        table.insert(*english, *code);
    }
    table
});

/// Resolve a city display name to its location code
///
/// # Errors
/// * `ToolError::UnknownLocation` if the name has no table entry. No
///   case folding or fuzzy matching is attempted.
pub fn resolve_city_code(city_name: &str) -> Result<&'static str, ToolError> {
    CITY_CODE_TABLE
        .get(city_name)
        .copied()
        .ok_or_else(|| ToolError::UnknownLocation(city_name.to_string()))
}

/// All accepted display names, sorted (offered to the engine as the
/// allowed values of city arguments)
pub fn known_city_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CITY_CODE_TABLE.keys().copied().collect();
    names.sort_unstable();
    names
}
