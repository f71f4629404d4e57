//! ipinfo.io response types.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::error::IpApiError;
use crate::types::Coordinates;

/// Query string for a lookup.
#[derive(Serialize)]
pub(crate) struct IpInfoQuery<'a> {
    pub token: &'a str,
}

/// Geolocation returned by ipinfo.io.
///
/// ipinfo.io omits fields it has no data for, and bogon addresses come back
/// with little more than `ip` and `bogon`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpInfoResponse {
    /// The address that was looked up
    pub ip: String,
    /// Reverse DNS name
    pub hostname: Option<String>,
    /// City
    pub city: Option<String>,
    /// Region name
    pub region: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    pub country: Option<String>,
    /// Coordinates as `"lat,lon"`
    pub loc: Option<String>,
    /// AS number and organization, e.g. `AS15169 Google LLC`
    pub org: Option<String>,
    /// Postal code
    pub postal: Option<String>,
    /// IANA time zone name
    pub timezone: Option<String>,
    /// Anycast address
    pub anycast: Option<bool>,
    /// Private, reserved or otherwise unroutable address
    pub bogon: Option<bool>,
}

impl IpInfoResponse {
    /// Parse `loc` into coordinates.
    pub fn coordinates(&self) -> Option<Result<Coordinates, IpApiError>> {
        self.loc.as_deref().map(str::parse)
    }

    /// Whether ipinfo.io classified the address as a bogon.
    pub fn is_bogon(&self) -> bool {
        self.bogon.unwrap_or(false)
    }
}
