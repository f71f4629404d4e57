//! abstractapi.com response types.
//!
//! Every field is optional: the provider leaves out whatever it does not know.

use serde::{Deserialize, Serialize};

use crate::types::OrString;

/// Anonymity signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    /// Address belongs to a VPN
    pub is_vpn: Option<bool>,
}

/// Time zone of the location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timezone {
    /// IANA time zone name
    pub name: Option<String>,
    /// Abbreviation, e.g. `PST`
    pub abbreviation: Option<String>,
    /// Offset from GMT in hours, sometimes sent as a string
    pub gmt_offset: Option<OrString<i64>>,
    /// Local time at the location
    pub current_time: Option<String>,
    /// Daylight saving time in effect, sometimes sent as a string
    pub is_dst: Option<OrString<bool>>,
}

/// Country flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    /// Flag emoji
    pub emoji: Option<String>,
    /// Flag emoji as unicode code points
    pub unicode: Option<String>,
    /// URL of a PNG image
    pub png: Option<String>,
    /// URL of an SVG image
    pub svg: Option<String>,
}

/// National currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Currency name
    pub currency_name: Option<String>,
    /// ISO 4217 currency code
    pub currency_code: Option<String>,
}

/// Network the address belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Autonomous system number
    pub autonomous_system_number: Option<u32>,
    /// Autonomous system organization
    pub autonomous_system_organization: Option<String>,
    /// Connection type, e.g. `Corporate`
    pub connection_type: Option<String>,
    /// ISP name
    pub isp_name: Option<String>,
    /// Organization name
    pub organization_name: Option<String>,
}

/// Query string for a lookup.
#[derive(Serialize)]
pub(crate) struct AbstractApiQuery<'a> {
    pub api_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Geolocation returned by abstractapi.com.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbstractApiResponse {
    /// The address that was looked up
    pub ip_address: Option<String>,
    /// City
    pub city: Option<String>,
    /// GeoNames identifier of the city
    pub city_geoname_id: Option<i64>,
    /// Region name
    pub region: Option<String>,
    /// ISO 3166-2 region code
    pub region_iso_code: Option<String>,
    /// GeoNames identifier of the region
    pub region_geoname_id: Option<i64>,
    /// Postal code
    pub postal_code: Option<String>,
    /// Country name
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: Option<String>,
    /// GeoNames identifier of the country
    pub country_geoname_id: Option<i64>,
    /// Member of the European Union
    pub country_is_eu: Option<bool>,
    /// Continent name
    pub continent: Option<String>,
    /// Two-letter continent code
    pub continent_code: Option<String>,
    /// GeoNames identifier of the continent
    pub continent_geoname_id: Option<i64>,
    /// Longitude
    pub longitude: Option<f64>,
    /// Latitude
    pub latitude: Option<f64>,
    /// Anonymity signals
    #[serde(default)]
    pub security: Security,
    /// Time zone
    #[serde(default)]
    pub timezone: Timezone,
    /// Country flag
    pub flag: Option<Flag>,
    /// National currency
    pub currency: Option<Currency>,
    /// Network details
    #[serde(default)]
    pub connection: Connection,
}
