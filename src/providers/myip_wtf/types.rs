//! myip.wtf response types.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Serialize};

use crate::types::serde_helpers::lenient_bool;

/// The caller's address as reported by myip.wtf.
///
/// The provider sends a single `YourFuckingIPAddress`/`YourFuckingHostname`
/// pair; they are split by address family here so that a combined lookup can
/// carry both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MyIpWtfWire")]
pub struct MyIpWtfResponse {
    /// IPv4 address, if resolved
    #[serde(rename = "YourFuckingIPv4Address")]
    pub ipv4: Option<Ipv4Addr>,
    /// IPv6 address, if resolved
    #[serde(rename = "YourFuckingIPv6Address")]
    pub ipv6: Option<Ipv6Addr>,
    /// Human-readable location
    #[serde(rename = "YourFuckingLocation")]
    pub location: String,
    /// Reverse DNS of the IPv4 address
    #[serde(rename = "YourFuckingv4Hostname")]
    pub v4_hostname: Option<String>,
    /// Reverse DNS of the IPv6 address
    #[serde(rename = "YourFuckingv6Hostname")]
    pub v6_hostname: Option<String>,
    /// ISP name
    #[serde(rename = "YourFuckingISP")]
    pub isp: String,
    /// Address is a Tor exit node
    #[serde(rename = "YourFuckingTorExit")]
    pub tor_exit: bool,
    /// ISO 3166-1 alpha-2 country code
    #[serde(rename = "YourFuckingCountryCode")]
    pub country_code: String,
}

impl MyIpWtfResponse {
    /// Merge the halves of a combined lookup.
    ///
    /// Location, ISP, Tor and country come from the IPv4 half when present.
    pub(crate) fn merge(ipv4: Option<Self>, ipv6: Option<Self>) -> Self {
        match (ipv4, ipv6) {
            (Some(v4), Some(v6)) => Self {
                ipv4: v4.ipv4,
                ipv6: v6.ipv6,
                v4_hostname: v4.v4_hostname,
                v6_hostname: v6.v6_hostname,
                ..v4
            },
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => Self::empty(),
        }
    }

    fn empty() -> Self {
        Self {
            ipv4: None,
            ipv6: None,
            location: String::new(),
            v4_hostname: None,
            v6_hostname: None,
            isp: String::new(),
            tor_exit: false,
            country_code: String::new(),
        }
    }
}

/// Accepts both the provider's single-address form and the split form this
/// crate serializes.
#[derive(Deserialize)]
struct MyIpWtfWire {
    #[serde(rename = "YourFuckingIPAddress")]
    ip: Option<IpAddr>,
    #[serde(rename = "YourFuckingHostname")]
    hostname: Option<String>,
    #[serde(rename = "YourFuckingIPv4Address")]
    ipv4: Option<Ipv4Addr>,
    #[serde(rename = "YourFuckingIPv6Address")]
    ipv6: Option<Ipv6Addr>,
    #[serde(rename = "YourFuckingv4Hostname")]
    v4_hostname: Option<String>,
    #[serde(rename = "YourFuckingv6Hostname")]
    v6_hostname: Option<String>,
    #[serde(rename = "YourFuckingLocation")]
    location: String,
    #[serde(rename = "YourFuckingISP")]
    isp: String,
    #[serde(rename = "YourFuckingTorExit", deserialize_with = "lenient_bool::deserialize")]
    tor_exit: bool,
    #[serde(rename = "YourFuckingCountryCode")]
    country_code: String,
}

impl TryFrom<MyIpWtfWire> for MyIpWtfResponse {
    type Error = String;

    fn try_from(wire: MyIpWtfWire) -> Result<Self, Self::Error> {
        let mut response = Self {
            ipv4: wire.ipv4,
            ipv6: wire.ipv6,
            location: wire.location,
            v4_hostname: wire.v4_hostname,
            v6_hostname: wire.v6_hostname,
            isp: wire.isp,
            tor_exit: wire.tor_exit,
            country_code: wire.country_code,
        };
        match wire.ip {
            Some(IpAddr::V4(ip)) => {
                response.ipv4 = Some(ip);
                response.v4_hostname = response.v4_hostname.or(wire.hostname);
            }
            Some(IpAddr::V6(ip)) => {
                response.ipv6 = Some(ip);
                response.v6_hostname = response.v6_hostname.or(wire.hostname);
            }
            None => {}
        }
        if response.ipv4.is_none() && response.ipv6.is_none() {
            return Err("response carries no IP address".to_string());
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V4: &str = r#"{"YourFuckingIPAddress":"203.0.113.7","YourFuckingLocation":"Berlin, BE, Germany","YourFuckingHostname":"host.example.net","YourFuckingISP":"Example Telecom","YourFuckingTorExit":false,"YourFuckingCountryCode":"DE"}"#;
    const V6: &str = r#"{"YourFuckingIPAddress":"2001:db8::7","YourFuckingLocation":"Berlin, BE, Germany","YourFuckingHostname":"v6.example.net","YourFuckingISP":"Example Telecom","YourFuckingTorExit":"false","YourFuckingCountryCode":"DE"}"#;

    #[test]
    fn test_address_is_split_by_family() {
        let v4: MyIpWtfResponse = serde_json::from_str(V4).unwrap();
        assert_eq!(v4.ipv4, Some(Ipv4Addr::new(203, 0, 113, 7)));
        assert_eq!(v4.v4_hostname.as_deref(), Some("host.example.net"));
        assert!(v4.ipv6.is_none());

        let v6: MyIpWtfResponse = serde_json::from_str(V6).unwrap();
        assert!(v6.ipv4.is_none());
        assert_eq!(v6.v6_hostname.as_deref(), Some("v6.example.net"));
        assert!(!v6.tor_exit);
    }

    #[test]
    fn test_merge_and_round_trip() {
        let v4: MyIpWtfResponse = serde_json::from_str(V4).unwrap();
        let v6: MyIpWtfResponse = serde_json::from_str(V6).unwrap();
        let merged = MyIpWtfResponse::merge(Some(v4), Some(v6));
        assert!(merged.ipv4.is_some() && merged.ipv6.is_some());
        assert_eq!(merged.v6_hostname.as_deref(), Some("v6.example.net"));

        let json = serde_json::to_string(&merged).unwrap();
        assert!(json.contains("YourFuckingIPv6Address"));
        let back: MyIpWtfResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, merged);
    }

    #[test]
    fn test_missing_address_is_rejected() {
        let body = r#"{"YourFuckingLocation":"x","YourFuckingISP":"y","YourFuckingTorExit":false,"YourFuckingCountryCode":"DE"}"#;
        assert!(serde_json::from_str::<MyIpWtfResponse>(body).is_err());
    }
}
