//! myip.wtf (wtfismyip.com) adapter.
//!
//! The service asks automated clients for at most one request per minute.
//! The default allows two so that a combined lookup fits in one window. Any
//! non-200 answer is treated as the service throttling the caller.

mod types;

pub use types::MyIpWtfResponse;

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{ErrorKind, IpApiError};
use crate::providers::decision::{DecisionTable, GateEffect, Rule, Signal};
use crate::providers::endpoints;
use crate::providers::pipeline::{
    merge_combined, no_limit_hints, no_payload_error, CommonSettings, Pipeline, ProviderProfile,
};
use crate::providers::SelfIpEndpoints;
use crate::rate_limit::{limits, Clock, RateLimitGate, RateLimitPolicy, RejectionKind};
use crate::resolver::SelfIpResolver;
use crate::transport::{RequestOptions, Transport};
use crate::types::IpVersion;

static RULES: &[Rule] = &[
    Rule::new(
        Signal::Status(429),
        ErrorKind::RateLimit,
        GateEffect::Reject(RejectionKind::Window),
        "You sent too many requests",
    ),
    Rule::new(
        Signal::AnyFailureStatus,
        ErrorKind::Quota,
        GateEffect::Reject(RejectionKind::Window),
        "You have reached the request limit for this API",
    ),
];

static PROFILE: ProviderProfile = ProviderProfile {
    name: "myip.wtf",
    table: DecisionTable::new(RULES),
    payload_error: no_payload_error,
    limit_hints: no_limit_hints,
};

/// Self-IP resolver for myip.wtf.
///
/// # Example
///
/// ```rust,no_run
/// use cool_ip_api::providers::MyIpWtf;
/// use cool_ip_api::{IpVersion, RequestOptions, SelfIpResolver};
///
/// let resolver = MyIpWtf::new();
/// let me = resolver.resolve(IpVersion::Combined, &RequestOptions::new())?;
/// println!("{:?} / {:?} via {}", me.ipv4, me.ipv6, me.isp);
/// # Ok::<(), cool_ip_api::IpApiError>(())
/// ```
pub struct MyIpWtf {
    pipeline: Pipeline,
    endpoints: SelfIpEndpoints,
}

impl MyIpWtf {
    /// Create a resolver with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new resolver builder.
    pub fn builder() -> MyIpWtfBuilder {
        MyIpWtfBuilder::new()
    }

    /// The rate-limit gate guarding this resolver.
    pub fn gate(&self) -> &RateLimitGate {
        self.pipeline.gate()
    }

    fn url(&self, version: IpVersion) -> Result<Url, IpApiError> {
        Ok(Url::parse(self.endpoints.url_for(version))?)
    }

    fn fetch_blocking(
        &self,
        version: IpVersion,
        options: &RequestOptions,
    ) -> Result<MyIpWtfResponse, IpApiError> {
        let url = self.url(version)?;
        self.pipeline.fetch_blocking(&url, options)
    }

    async fn fetch(
        &self,
        version: IpVersion,
        options: &RequestOptions,
    ) -> Result<MyIpWtfResponse, IpApiError> {
        let url = self.url(version)?;
        self.pipeline.fetch(&url, options).await
    }
}

impl Default for MyIpWtf {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MyIpWtf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MyIpWtf")
            .field("endpoints", &self.endpoints)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl SelfIpResolver for MyIpWtf {
    type Response = MyIpWtfResponse;

    fn resolve(
        &self,
        version: IpVersion,
        options: &RequestOptions,
    ) -> Result<MyIpWtfResponse, IpApiError> {
        match version {
            IpVersion::Combined => {
                let ipv4 = self.fetch_blocking(IpVersion::Ipv4, options);
                let ipv6 = self.fetch_blocking(IpVersion::Ipv6, options);
                merge_combined(self.pipeline.name(), ipv4, ipv6, MyIpWtfResponse::merge)
            }
            single => self.fetch_blocking(single, options),
        }
    }

    async fn resolve_async(
        &self,
        version: IpVersion,
        options: &RequestOptions,
    ) -> Result<MyIpWtfResponse, IpApiError> {
        match version {
            IpVersion::Combined => {
                let ipv4 = self.fetch(IpVersion::Ipv4, options).await;
                let ipv6 = self.fetch(IpVersion::Ipv6, options).await;
                merge_combined(self.pipeline.name(), ipv4, ipv6, MyIpWtfResponse::merge)
            }
            single => self.fetch(single, options).await,
        }
    }
}

/// Builder for [`MyIpWtf`].
pub struct MyIpWtfBuilder {
    endpoints: SelfIpEndpoints,
    settings: CommonSettings,
}

impl MyIpWtfBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            endpoints: SelfIpEndpoints::new(
                endpoints::myip_wtf::IPV4,
                endpoints::myip_wtf::IPV6,
                endpoints::myip_wtf::DUALSTACK,
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

    /// Override the default two requests per minute.
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.settings.policy = Some(policy);
        self
    }

    /// Build the resolver.
    pub fn build(self) -> MyIpWtf {
        let policy = RateLimitPolicy::new(
            limits::myip_wtf::LIMIT_AMOUNT,
            Duration::from_secs(limits::myip_wtf::WINDOW_SECS),
        );
        MyIpWtf {
            pipeline: Pipeline::new(&PROFILE, self.settings, Some(policy)),
            endpoints: self.endpoints,
        }
    }
}

impl Default for MyIpWtfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    const V4: &str = r#"{"YourFuckingIPAddress":"203.0.113.7","YourFuckingLocation":"Berlin, BE, Germany","YourFuckingHostname":"host.example.net","YourFuckingISP":"Example Telecom","YourFuckingTorExit":false,"YourFuckingCountryCode":"DE"}"#;

    #[test]
    fn test_combined_with_ipv6_down() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(200, V4);
        transport.fail("network unreachable");
        let resolver = MyIpWtf::builder().transport(transport.clone()).build();

        let me = resolver
            .resolve(IpVersion::Combined, &RequestOptions::new())
            .unwrap();
        assert!(me.ipv4.is_some());
        assert!(me.ipv6.is_none());

        let urls = transport.requested_urls();
        assert_eq!(urls[0].as_str(), "https://ipv4.wtfismyip.com/json");
        assert_eq!(urls[1].as_str(), "https://ipv6.wtfismyip.com/json");
        // The failed transport call consumed nothing.
        assert_eq!(resolver.gate().remaining(), Some(1));
    }

    #[test]
    fn test_non_200_is_quota_for_one_window() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(503, "slow down");
        let resolver = MyIpWtf::builder().transport(transport).build();

        let err = resolver
            .resolve(IpVersion::DualStack, &RequestOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Quota);
        let snapshot = resolver.gate().snapshot().unwrap();
        assert_eq!(snapshot.remaining, 0);
    }
}
