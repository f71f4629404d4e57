//! ip-api.com request and response types.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};

/// Response language for localized fields (country, region, city names).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English
    #[default]
    #[serde(rename = "en")]
    En,
    /// German
    #[serde(rename = "de")]
    De,
    /// Spanish
    #[serde(rename = "es")]
    Es,
    /// French
    #[serde(rename = "fr")]
    Fr,
    /// Japanese
    #[serde(rename = "ja")]
    Ja,
    /// Brazilian Portuguese
    #[serde(rename = "pt-BR")]
    PtBr,
    /// Russian
    #[serde(rename = "ru")]
    Ru,
    /// Simplified Chinese
    #[serde(rename = "zh-CN")]
    ZhCn,
}

impl Language {
    /// The language code sent in the `lang` query parameter.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::Ja => "ja",
            Language::PtBr => "pt-BR",
            Language::Ru => "ru",
            Language::ZhCn => "zh-CN",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query outcome reported in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// The lookup succeeded
    Success,
    /// The lookup failed; see `message`
    Fail,
}

/// Query string for a lookup.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct IpApiComQuery {
    pub fields: u32,
    pub lang: Language,
}

/// Geolocation returned by ip-api.com.
///
/// Empty strings (e.g. `district` outside big cities) are mapped to `None`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpApiComResponse {
    /// `success` for every response that reaches the caller
    pub status: QueryStatus,
    /// Error message, only present on failed lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Continent name
    pub continent: String,
    /// Two-letter continent code
    pub continent_code: String,
    /// Country name
    pub country: String,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    /// Region or state short code
    pub region: String,
    /// Region or state name
    pub region_name: String,
    /// City
    pub city: String,
    /// District (subdivision of city)
    #[serde_as(as = "NoneAsEmptyString")]
    pub district: Option<String>,
    /// Zip code
    #[serde_as(as = "NoneAsEmptyString")]
    pub zip: Option<String>,
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
    /// IANA time zone name
    pub timezone: String,
    /// UTC offset in seconds
    pub offset: i32,
    /// National currency
    pub currency: String,
    /// ISP name
    pub isp: String,
    /// Organization name
    pub org: String,
    /// AS number and organization, e.g. `AS13335 Cloudflare, Inc.`
    #[serde(rename = "as")]
    pub as_: String,
    /// AS name (RIR)
    pub asname: String,
    /// Reverse DNS of the IP
    #[serde_as(as = "NoneAsEmptyString")]
    pub reverse: Option<String>,
    /// Mobile (cellular) connection
    pub mobile: bool,
    /// Proxy, VPN or Tor exit address
    pub proxy: bool,
    /// Hosting, colocated or data center
    pub hosting: bool,
    /// The address that was looked up
    pub query: String,
}
