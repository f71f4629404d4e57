//! ipify.org adapter.
//!
//! No documented limit, so the gate is unlimited unless a policy is set.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ErrorKind, IpApiError};
use crate::providers::decision::{DecisionTable, GateEffect, Rule, Signal};
use crate::providers::endpoints;
use crate::providers::pipeline::{
    merge_combined, no_limit_hints, no_payload_error, with_query, CommonSettings, Pipeline,
    ProviderProfile,
};
use crate::providers::SelfIpEndpoints;
use crate::rate_limit::{Clock, RateLimitGate, RateLimitPolicy, RejectionKind};
use crate::resolver::SelfIpResolver;
use crate::transport::{RequestOptions, Transport};
use crate::types::IpVersion;

static RULES: &[Rule] = &[Rule::new(
    Signal::Status(429),
    ErrorKind::RateLimit,
    GateEffect::Reject(RejectionKind::Window),
    "You sent too many requests",
)];

static PROFILE: ProviderProfile = ProviderProfile {
    name: "ipify.org",
    table: DecisionTable::new(RULES),
    payload_error: no_payload_error,
    limit_hints: no_limit_hints,
};

/// The caller's address as reported by ipify.org.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpifyResponse {
    /// IPv4 address, if resolved
    pub ipv4: Option<Ipv4Addr>,
    /// IPv6 address, if resolved
    pub ipv6: Option<Ipv6Addr>,
}

impl IpifyResponse {
    fn merge(ipv4: Option<Self>, ipv6: Option<Self>) -> Self {
        Self {
            ipv4: ipv4.and_then(|r| r.ipv4),
            ipv6: ipv6.and_then(|r| r.ipv6),
        }
    }
}

impl From<IpAddr> for IpifyResponse {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Self {
                ipv4: Some(v4),
                ipv6: None,
            },
            IpAddr::V6(v6) => Self {
                ipv4: None,
                ipv6: Some(v6),
            },
        }
    }
}

/// `{"ip": "203.0.113.7"}`
#[derive(Deserialize)]
struct IpifyWire {
    ip: IpAddr,
}

#[derive(Serialize)]
struct FormatQuery {
    format: &'static str,
}

/// Self-IP resolver for ipify.org.
///
/// # Example
///
/// ```rust,no_run
/// use cool_ip_api::providers::Ipify;
/// use cool_ip_api::{IpVersion, RequestOptions, SelfIpResolver};
///
/// # async fn run() -> cool_ip_api::Result<()> {
/// let resolver = Ipify::new();
/// let me = resolver
///     .resolve_async(IpVersion::Ipv4, &RequestOptions::new())
///     .await?;
/// println!("{:?}", me.ipv4);
/// # Ok(())
/// # }
/// ```
pub struct Ipify {
    pipeline: Pipeline,
    endpoints: SelfIpEndpoints,
}

impl Ipify {
    /// Create a resolver with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new resolver builder.
    pub fn builder() -> IpifyBuilder {
        IpifyBuilder::new()
    }

    /// The rate-limit gate guarding this resolver.
    pub fn gate(&self) -> &RateLimitGate {
        self.pipeline.gate()
    }

    fn url(&self, version: IpVersion) -> Result<Url, IpApiError> {
        let url = Url::parse(self.endpoints.url_for(version))?;
        with_query(url, &FormatQuery { format: "json" })
    }

    fn fetch_blocking(
        &self,
        version: IpVersion,
        options: &RequestOptions,
    ) -> Result<IpifyResponse, IpApiError> {
        let url = self.url(version)?;
        let wire: IpifyWire = self.pipeline.fetch_blocking(&url, options)?;
        Ok(wire.ip.into())
    }

    async fn fetch(
        &self,
        version: IpVersion,
        options: &RequestOptions,
    ) -> Result<IpifyResponse, IpApiError> {
        let url = self.url(version)?;
        let wire: IpifyWire = self.pipeline.fetch(&url, options).await?;
        Ok(wire.ip.into())
    }
}

impl Default for Ipify {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ipify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ipify")
            .field("endpoints", &self.endpoints)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl SelfIpResolver for Ipify {
    type Response = IpifyResponse;

    fn resolve(
        &self,
        version: IpVersion,
        options: &RequestOptions,
    ) -> Result<IpifyResponse, IpApiError> {
        match version {
            IpVersion::Combined => {
                let ipv4 = self.fetch_blocking(IpVersion::Ipv4, options);
                let ipv6 = self.fetch_blocking(IpVersion::Ipv6, options);
                merge_combined(self.pipeline.name(), ipv4, ipv6, IpifyResponse::merge)
            }
            single => self.fetch_blocking(single, options),
        }
    }

    async fn resolve_async(
        &self,
        version: IpVersion,
        options: &RequestOptions,
    ) -> Result<IpifyResponse, IpApiError> {
        match version {
            IpVersion::Combined => {
                let ipv4 = self.fetch(IpVersion::Ipv4, options).await;
                let ipv6 = self.fetch(IpVersion::Ipv6, options).await;
                merge_combined(self.pipeline.name(), ipv4, ipv6, IpifyResponse::merge)
            }
            single => self.fetch(single, options).await,
        }
    }
}

/// Builder for [`Ipify`].
pub struct IpifyBuilder {
    endpoints: SelfIpEndpoints,
    settings: CommonSettings,
}

impl IpifyBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            endpoints: SelfIpEndpoints::new(
                endpoints::ipify::IPV4,
                endpoints::ipify::IPV6,
                endpoints::ipify::DUALSTACK,
            ),
            settings: CommonSettings::default(),
        }
    }

    /// Set the per-family URLs (useful for testing with a mock server).
    pub fn endpoints(mut self, endpoints: SelfIpEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the transport performing the HTTP requests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.settings.transport = Some(transport);
        self
    }

    /// Set the clock driving the rate-limit window.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.settings.clock = Some(clock);
        self
    }

    /// Enforce a limit; ipify.org documents none.
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.settings.policy = Some(policy);
        self
    }

    /// Build the resolver.
    pub fn build(self) -> Ipify {
        Ipify {
            pipeline: Pipeline::new(&PROFILE, self.settings, None),
            endpoints: self.endpoints,
        }
    }
}

impl Default for IpifyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
