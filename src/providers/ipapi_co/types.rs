//! ipapi.co response types.

use serde::{Deserialize, Serialize};

use crate::types::serde_helpers::{comma_separated, default_on_error};

/// Address family of the looked-up IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpFamily {
    /// IPv4
    #[serde(rename = "IPv4")]
    Ipv4,
    /// IPv6
    #[serde(rename = "IPv6")]
    Ipv6,
}

/// Geolocation returned by ipapi.co.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpapiCoResponse {
    /// The address that was looked up
    pub ip: String,
    /// Enclosing network in CIDR notation
    pub network: String,
    /// Address family
    pub version: IpFamily,
    /// City
    pub city: String,
    /// Region name
    pub region: String,
    /// Region code
    pub region_code: String,
    /// ISO 3166-1 alpha-2 country code
    pub country: String,
    /// Country name
    pub country_name: String,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    /// ISO 3166-1 alpha-3 country code
    pub country_code_iso3: String,
    /// Capital of the country
    pub country_capital: String,
    /// Country top-level domain, e.g. `.us`
    pub country_tld: String,
    /// Two-letter continent code
    pub continent_code: String,
    /// Member of the European Union
    pub in_eu: bool,
    /// Postal code, missing for some regions
    pub postal: Option<String>,
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
    /// IANA time zone name
    pub timezone: String,
    /// UTC offset as `+HHMM`
    pub utc_offset: String,
    /// Country calling code, e.g. `+1`
    pub country_calling_code: String,
    /// ISO 4217 currency code
    pub currency: String,
    /// Currency name
    pub currency_name: String,
    /// Language tags spoken in the country
    #[serde(with = "comma_separated")]
    pub languages: Vec<String>,
    /// Country area in square kilometers
    #[serde(deserialize_with = "default_on_error::deserialize", default)]
    pub country_area: Option<f64>,
    /// Country population
    #[serde(deserialize_with = "default_on_error::deserialize", default)]
    pub country_population: Option<u64>,
    /// Autonomous system number, e.g. `AS15169`
    pub asn: String,
    /// Organization owning the address
    pub org: String,
}
