//! ipwho.is response types.

use serde::{Deserialize, Serialize};

use crate::types::serde_helpers::comma_separated;

/// Country flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    /// URL of an SVG image
    pub img: String,
    /// Flag emoji
    pub emoji: String,
    /// Flag emoji as unicode code points
    pub emoji_unicode: String,
}

/// Network the address belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Autonomous system number
    pub asn: u32,
    /// Organization name
    pub org: String,
    /// ISP name
    pub isp: String,
    /// Organization domain
    pub domain: String,
}

/// Time zone of the location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timezone {
    /// IANA time zone name
    pub id: String,
    /// Abbreviation, e.g. `PDT`
    pub abbr: String,
    /// Daylight saving time in effect
    pub is_dst: bool,
    /// UTC offset in seconds
    pub offset: i32,
    /// UTC offset as `+HH:MM`
    pub utc: String,
    /// Local time at the location, RFC 3339
    pub current_time: String,
}

/// Geolocation returned by ipwho.is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpWhoIsResponse {
    /// The address that was looked up
    pub ip: String,
    /// Always `true` for responses that reach the caller
    pub success: bool,
    /// `IPv4` or `IPv6`
    #[serde(rename = "type")]
    pub address_type: String,
    /// Continent name
    pub continent: String,
    /// Two-letter continent code
    pub continent_code: String,
    /// Country name
    pub country: String,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    /// Region name
    pub region: String,
    /// Region code
    pub region_code: String,
    /// City
    pub city: String,
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
    /// Member of the European Union
    pub is_eu: bool,
    /// Postal code
    pub postal: String,
    /// Calling code without the `+`
    pub calling_code: String,
    /// Capital city
    pub capital: String,
    /// Country codes of neighboring countries
    #[serde(with = "comma_separated")]
    pub borders: Vec<String>,
    /// Country flag
    pub flag: Flag,
    /// Network details
    pub connection: Connection,
    /// Time zone
    pub timezone: Timezone,
}
