//! Common domain types shared by all providers.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IpApiError;

/// What a full resolver should look up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Target {
    /// The caller's own public address
    #[default]
    Own,
    /// A specific IP address
    Addr(IpAddr),
    /// A domain name, for providers that resolve names themselves
    Host(String),
}

impl Target {
    /// Parse user input: empty means [`Target::Own`], an IP literal means
    /// [`Target::Addr`], a well-formed host name means [`Target::Host`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use cool_ip_api::Target;
    ///
    /// assert_eq!(Target::parse("").unwrap(), Target::Own);
    /// assert!(matches!(Target::parse("1.1.1.1").unwrap(), Target::Addr(_)));
    /// assert!(matches!(Target::parse("example.com").unwrap(), Target::Host(_)));
    /// assert!(Target::parse("not a host").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, IpApiError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Target::Own);
        }
        if let Ok(addr) = input.parse::<IpAddr>() {
            return Ok(Target::Addr(addr));
        }
        if is_host_name(input) {
            return Ok(Target::Host(input.to_ascii_lowercase()));
        }
        Err(IpApiError::InvalidInput(format!(
            "'{}' is neither an IP address nor a host name",
            input
        )))
    }

    /// Check whether this targets the caller's own address.
    pub fn is_own(&self) -> bool {
        matches!(self, Target::Own)
    }

    /// Reject host names for providers that only resolve IP addresses.
    pub(crate) fn require_ip(&self, provider: &str) -> Result<Option<IpAddr>, IpApiError> {
        match self {
            Target::Own => Ok(None),
            Target::Addr(addr) => Ok(Some(*addr)),
            Target::Host(host) => Err(IpApiError::InvalidInput(format!(
                "{} only resolves IP addresses, got host name '{}'",
                provider, host
            ))),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Own => Ok(()),
            Target::Addr(addr) => write!(f, "{}", addr),
            Target::Host(host) => write!(f, "{}", host),
        }
    }
}

impl FromStr for Target {
    type Err = IpApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::parse(s)
    }
}

impl From<IpAddr> for Target {
    fn from(addr: IpAddr) -> Self {
        Target::Addr(addr)
    }
}

impl From<Ipv4Addr> for Target {
    fn from(addr: Ipv4Addr) -> Self {
        Target::Addr(IpAddr::V4(addr))
    }
}

impl From<Ipv6Addr> for Target {
    fn from(addr: Ipv6Addr) -> Self {
        Target::Addr(IpAddr::V6(addr))
    }
}

impl From<Option<IpAddr>> for Target {
    fn from(addr: Option<IpAddr>) -> Self {
        addr.map_or(Target::Own, Target::Addr)
    }
}

fn is_host_name(input: &str) -> bool {
    if input.len() > 253 {
        return false;
    }
    let labels: Vec<&str> = input.trim_end_matches('.').split('.').collect();
    let well_formed = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    // An all-numeric last label would be a malformed IPv4 address.
    let tld_alpha = labels
        .last()
        .is_some_and(|tld| tld.chars().any(|c| c.is_ascii_alphabetic()));
    well_formed && tld_alpha
}

/// Address family selector for self-IP providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    /// IPv4 only
    Ipv4,
    /// IPv6 only
    Ipv6,
    /// Whichever family the network path prefers
    DualStack,
    /// Both families, one request each, tolerating one failure
    Combined,
}

impl std::fmt::Display for IpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IpVersion::Ipv4 => "ipv4",
            IpVersion::Ipv6 => "ipv6",
            IpVersion::DualStack => "dualstack",
            IpVersion::Combined => "combined",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for IpVersion {
    type Err = IpApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ipv4" | "4" => Ok(IpVersion::Ipv4),
            "ipv6" | "6" => Ok(IpVersion::Ipv6),
            "dualstack" => Ok(IpVersion::DualStack),
            "combined" => Ok(IpVersion::Combined),
            other => Err(IpApiError::InvalidInput(format!(
                "unknown IP version '{}', expected ipv4, ipv6, dualstack or combined",
                other
            ))),
        }
    }
}

/// Latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
}

impl FromStr for Coordinates {
    type Err = IpApiError;

    /// Parse the `"lat,lon"` form used by ipinfo.io.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IpApiError::InvalidResponse(format!("invalid coordinates '{}'", s));
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        Ok(Self {
            latitude: lat.trim().parse().map_err(|_| invalid())?,
            longitude: lon.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// A field some providers send either typed or as a string.
///
/// Serializes back in whichever form it was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrString<T> {
    /// The typed form
    Value(T),
    /// The string form
    Text(String),
}

impl<T: FromStr + Clone> OrString<T> {
    /// The typed value, parsing the string form if needed.
    pub fn value(&self) -> Option<T> {
        match self {
            OrString::Value(v) => Some(v.clone()),
            OrString::Text(s) => s.parse().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parse() {
        assert_eq!(Target::parse("  ").unwrap(), Target::Own);
        assert_eq!(
            Target::parse("2606:4700:4700::1111").unwrap(),
            Target::Addr("2606:4700:4700::1111".parse().unwrap())
        );
        assert_eq!(
            Target::parse("One.One.One.One").unwrap(),
            Target::Host("one.one.one.one".to_string())
        );
        assert!(Target::parse("1.2.3").is_err());
        assert!(Target::parse("-bad.example").is_err());
        assert!(Target::parse("a/b").is_err());
    }

    #[test]
    fn test_require_ip() {
        let host = Target::Host("example.com".into());
        let err = host.require_ip("ipwho.is").unwrap_err();
        assert!(matches!(err, IpApiError::InvalidInput(_)));
        assert_eq!(Target::Own.require_ip("ipwho.is").unwrap(), None);
    }

    #[test]
    fn test_ip_version_round_trip() {
        for version in [
            IpVersion::Ipv4,
            IpVersion::Ipv6,
            IpVersion::DualStack,
            IpVersion::Combined,
        ] {
            assert_eq!(version.to_string().parse::<IpVersion>().unwrap(), version);
        }
        assert!("ipv5".parse::<IpVersion>().is_err());
    }

    #[test]
    fn test_coordinates_parse() {
        let coords: Coordinates = "37.3860,-122.0838".parse().unwrap();
        assert_eq!(coords.latitude, 37.386);
        assert_eq!(coords.longitude, -122.0838);
        assert!("37.3860".parse::<Coordinates>().is_err());
    }

    #[test]
    fn test_or_string() {
        let typed: OrString<i64> = serde_json::from_str("-5").unwrap();
        let text: OrString<i64> = serde_json::from_str("\"-5\"").unwrap();
        assert_eq!(typed.value(), Some(-5));
        assert_eq!(text.value(), Some(-5));
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"-5\"");
    }
}
