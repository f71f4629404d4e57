//! abstractapi.com IP geolocation adapter.
//!
//! Free tier: one request per second; the monthly allowance is only signaled
//! by HTTP 422 once it runs out.

mod types;

pub use types::{AbstractApiResponse, Connection, Currency, Flag, Security, Timezone};

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::auth::ApiKey;
use crate::error::{ErrorKind, IpApiError};
use crate::providers::decision::{DecisionTable, GateEffect, Rule, Signal};
use crate::providers::endpoints::ABSTRACTAPI_BASE_URL;
use crate::providers::pipeline::{
    endpoint_url, no_limit_hints, no_payload_error, with_query, CommonSettings, Pipeline,
    ProviderProfile,
};
use crate::rate_limit::{limits, Clock, RateLimitGate, RateLimitPolicy, RejectionKind};
use crate::resolver::FullResolver;
use crate::transport::{RequestOptions, Transport};
use crate::types::Target;
use types::AbstractApiQuery;

static RULES: &[Rule] = &[
    Rule::new(
        Signal::Status(429),
        ErrorKind::RateLimit,
        GateEffect::Reject(RejectionKind::Window),
        "You sent requests too fast",
    ),
    Rule::new(
        Signal::Status(422),
        ErrorKind::Quota,
        GateEffect::Reject(RejectionKind::Quota),
        "You have reached the request limit for this API",
    ),
    Rule::new(
        Signal::Status(401),
        ErrorKind::Authentication,
        GateEffect::AuthFailure,
        "Invalid API key",
    ),
    Rule::new(
        Signal::Status(403),
        ErrorKind::Authentication,
        GateEffect::AuthFailure,
        "API key not allowed to use this endpoint",
    ),
    Rule::new(
        Signal::Status(400),
        ErrorKind::InvalidInput,
        GateEffect::Release,
        "Bad request",
    ),
    Rule::new(
        Signal::Status(404),
        ErrorKind::InvalidInput,
        GateEffect::Release,
        "Not found",
    ),
    Rule::new(
        Signal::Status(405),
        ErrorKind::InvalidInput,
        GateEffect::Release,
        "Method not allowed",
    ),
];

static PROFILE: ProviderProfile = ProviderProfile {
    name: "abstractapi.com",
    table: DecisionTable::new(RULES),
    payload_error: no_payload_error,
    limit_hints: no_limit_hints,
};

/// Resolver for abstractapi.com.
///
/// # Example
///
/// ```rust,no_run
/// use cool_ip_api::auth::ApiKey;
/// use cool_ip_api::providers::AbstractApi;
/// use cool_ip_api::FullResolverExt;
///
/// let key = ApiKey::from_env("ABSTRACTAPI_KEY").expect("ABSTRACTAPI_KEY not set");
/// let resolver = AbstractApi::new(key);
/// let response = resolver.lookup("166.171.248.255")?;
/// println!("{:?}", response.connection.isp_name);
/// # Ok::<(), cool_ip_api::IpApiError>(())
/// ```
pub struct AbstractApi {
    pipeline: Pipeline,
    base_url: String,
    api_key: ApiKey,
}

impl AbstractApi {
    /// Create a resolver with default settings.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self::builder(api_key).build()
    }

    /// Create a new resolver builder.
    pub fn builder(api_key: impl Into<ApiKey>) -> AbstractApiBuilder {
        AbstractApiBuilder::new(api_key)
    }

    /// The rate-limit gate guarding this resolver.
    pub fn gate(&self) -> &RateLimitGate {
        self.pipeline.gate()
    }

    fn url(&self, target: &Target) -> Result<Url, IpApiError> {
        let ip = target.require_ip(self.pipeline.name())?;
        let url = endpoint_url(&self.base_url, &[""])?;
        with_query(
            url,
            &AbstractApiQuery {
                api_key: self.api_key.expose(),
                ip_address: ip.map(|ip| ip.to_string()),
            },
        )
    }
}

impl std::fmt::Debug for AbstractApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbstractApi")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl FullResolver for AbstractApi {
    type Response = AbstractApiResponse;

    fn resolve(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<AbstractApiResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch_blocking(&url, options)
    }

    async fn resolve_async(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<AbstractApiResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch(&url, options).await
    }
}

/// Builder for [`AbstractApi`].
pub struct AbstractApiBuilder {
    base_url: String,
    api_key: ApiKey,
    settings: CommonSettings,
}

impl AbstractApiBuilder {
    /// Create a new builder with default settings.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self {
            base_url: ABSTRACTAPI_BASE_URL.to_string(),
            api_key: api_key.into(),
            settings: CommonSettings::default(),
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
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

    /// Override the default one request per second.
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.settings.policy = Some(policy);
        self
    }

    /// Build the resolver.
    pub fn build(self) -> AbstractApi {
        let policy = RateLimitPolicy::new(
            limits::abstractapi_com::LIMIT_AMOUNT,
            Duration::from_secs(limits::abstractapi_com::WINDOW_SECS),
        );
        AbstractApi {
            pipeline: Pipeline::new(&PROFILE, self.settings, Some(policy)),
            base_url: self.base_url,
            api_key: self.api_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::ManualClock;
    use crate::transport::MockTransport;

    #[test]
    fn test_url_shapes() {
        let resolver = AbstractApi::new("k3y");
        assert_eq!(
            resolver.url(&Target::Own).unwrap().as_str(),
            "https://ipgeolocation.abstractapi.com/v1/?api_key=k3y"
        );
        assert_eq!(
            resolver
                .url(&Target::parse("2001:db8::1").unwrap())
                .unwrap()
                .as_str(),
            "https://ipgeolocation.abstractapi.com/v1/?api_key=k3y&ip_address=2001%3Adb8%3A%3A1"
        );
    }

    #[test]
    fn test_quota_cooldown_outlasts_window() {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(MockTransport::new());
        transport.reply(422, r#"{"error":{"message":"quota reached"}}"#);
        let resolver = AbstractApi::builder("key")
            .transport(transport.clone())
            .clock(clock.clone())
            .build();

        let err = resolver
            .resolve(&Target::Own, &RequestOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Quota);

        clock.advance(Duration::from_secs(3600));
        let err = resolver
            .resolve(&Target::Own, &RequestOptions::new())
            .unwrap_err();
        assert!(err.is_local_rate_limit());
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_auth_failure_keeps_quota() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(401, "");
        let resolver = AbstractApi::builder("bad").transport(transport).build();

        let err = resolver
            .resolve(&Target::Own, &RequestOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(resolver.gate().remaining(), Some(1));
    }
}
