//! ipapi.com response types.

use serde::{Deserialize, Serialize};

/// Address family of the looked-up IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    /// IPv4
    Ipv4,
    /// IPv6
    Ipv6,
}

/// A language spoken in the country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenLanguage {
    /// ISO 639-1 code
    pub code: String,
    /// English name
    pub name: String,
    /// Native name
    pub native: String,
}

/// Country-level details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// GeoNames identifier
    pub geoname_id: Option<i64>,
    /// Capital city
    pub capital: String,
    /// Languages spoken in the country
    pub languages: Vec<SpokenLanguage>,
    /// URL of the flag image
    pub country_flag: String,
    /// Flag emoji
    pub country_flag_emoji: String,
    /// Flag emoji as unicode code points
    pub country_flag_emoji_unicode: String,
    /// Calling code without the `+`
    pub calling_code: String,
    /// Member of the European Union
    pub is_eu: bool,
}

/// Query string for a lookup.
#[derive(Serialize)]
pub(crate) struct IpapiComQuery<'a> {
    pub access_key: &'a str,
}

/// Geolocation returned by ipapi.com.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpapiComResponse {
    /// The address that was looked up
    pub ip: String,
    /// Address family
    #[serde(rename = "type")]
    pub address_type: AddressType,
    /// Two-letter continent code
    pub continent_code: String,
    /// Continent name
    pub continent_name: String,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    /// Country name
    pub country_name: String,
    /// Region code
    pub region_code: String,
    /// Region name
    pub region_name: String,
    /// City
    pub city: String,
    /// Zip code
    pub zip: String,
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
    /// Country-level details
    pub location: Location,
}
