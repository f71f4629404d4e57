//! Provider adapters.
//!
//! Every adapter wraps one web service behind [`FullResolver`] (geolocate any
//! target) or [`SelfIpResolver`] (report the caller's own address). Adapters
//! differ only in their URL layout, their response schema and their
//! [`DecisionTable`]; the request path itself is shared.
//!
//! | Adapter | Service | Key | Default limit |
//! |---|---|---|---|
//! | [`IpApiCom`] | ip-api.com | no | 45 / minute |
//! | [`IpapiCo`] | ipapi.co | no | 1000 / day |
//! | [`IpapiCom`] | ipapi.com | yes | 1000 / month |
//! | [`AbstractApi`] | abstractapi.com | yes | 1 / second |
//! | [`IpInfoIo`] | ipinfo.io | yes | 50000 / month |
//! | [`IpWhoIs`] | ipwho.is | no | 10000 / month |
//! | [`Ipify`] | ipify.org | no | none |
//! | [`MyIpWtf`] | myip.wtf | no | 2 / minute |
//!
//! Response types with clashing names (`Flag`, `Connection`, ...) are
//! reachable through their adapter's module.
//!
//! [`FullResolver`]: crate::FullResolver
//! [`SelfIpResolver`]: crate::SelfIpResolver

pub mod abstractapi_com;
pub mod decision;
pub mod endpoints;
pub mod ip_api_com;
pub mod ipapi_co;
pub mod ipapi_com;
pub mod ipify_org;
pub mod ipinfo_io;
pub mod ipwho_is;
pub mod myip_wtf;
pub(crate) mod pipeline;

pub use abstractapi_com::{AbstractApi, AbstractApiBuilder, AbstractApiResponse};
pub use decision::{DecisionTable, GateEffect, PayloadError, Rule, Signal, Verdict};
pub use ip_api_com::{IpApiCom, IpApiComBuilder, IpApiComResponse, Language, QueryStatus};
pub use ipapi_co::{IpFamily, IpapiCo, IpapiCoBuilder, IpapiCoResponse};
pub use ipapi_com::{IpapiCom, IpapiComBuilder, IpapiComResponse};
pub use ipify_org::{Ipify, IpifyBuilder, IpifyResponse};
pub use ipinfo_io::{IpInfoIo, IpInfoIoBuilder, IpInfoResponse};
pub use ipwho_is::{IpWhoIs, IpWhoIsBuilder, IpWhoIsResponse};
pub use myip_wtf::{MyIpWtf, MyIpWtfBuilder, MyIpWtfResponse};

use crate::types::IpVersion;

/// The per-family URLs of a self-IP service.
///
/// Self-IP services pick the reported address family by host name, so the
/// URLs are swapped as a set.
///
/// ```rust
/// use cool_ip_api::IpVersion;
/// use cool_ip_api::providers::SelfIpEndpoints;
///
/// let endpoints = SelfIpEndpoints::new(
///     "http://127.0.0.1:9000/v4",
///     "http://127.0.0.1:9000/v6",
///     "http://127.0.0.1:9000/any",
/// );
/// assert_eq!(endpoints.url_for(IpVersion::Ipv6), "http://127.0.0.1:9000/v6");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfIpEndpoints {
    /// Answers over IPv4 only
    pub ipv4: String,
    /// Answers over IPv6 only
    pub ipv6: String,
    /// Answers over whichever family the connection used
    pub dualstack: String,
}

impl SelfIpEndpoints {
    /// Create an endpoint set.
    pub fn new(
        ipv4: impl Into<String>,
        ipv6: impl Into<String>,
        dualstack: impl Into<String>,
    ) -> Self {
        Self {
            ipv4: ipv4.into(),
            ipv6: ipv6.into(),
            dualstack: dualstack.into(),
        }
    }

    /// The URL answering for `version`.
    ///
    /// Combined mode issues one request per family; asked directly it falls
    /// back to the dual-stack URL.
    pub fn url_for(&self, version: IpVersion) -> &str {
        match version {
            IpVersion::Ipv4 => &self.ipv4,
            IpVersion::Ipv6 => &self.ipv6,
            IpVersion::DualStack | IpVersion::Combined => &self.dualstack,
        }
    }
}
