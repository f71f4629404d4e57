//! ipapi.co adapter.
//!
//! Free tier: 1000 requests per day per client IP, no key.

mod types;

pub use types::{IpFamily, IpapiCoResponse};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::error::{ErrorKind, IpApiError};
use crate::providers::decision::{DecisionTable, GateEffect, PayloadError, Rule, Signal};
use crate::providers::endpoints::IPAPI_CO_BASE_URL;
use crate::providers::pipeline::{endpoint_url, no_limit_hints, CommonSettings, Pipeline, ProviderProfile};
use crate::rate_limit::{limits, Clock, RateLimitGate, RateLimitPolicy, RejectionKind};
use crate::resolver::FullResolver;
use crate::transport::{RequestOptions, Transport};
use crate::types::Target;

static RULES: &[Rule] = &[
    Rule::new(
        Signal::Status(429),
        ErrorKind::RateLimit,
        GateEffect::Reject(RejectionKind::Window),
        "You sent too many requests",
    ),
    Rule::new(
        Signal::Status(403),
        ErrorKind::Authentication,
        GateEffect::AuthFailure,
        "Invalid API key",
    ),
    Rule::new(
        Signal::Status(405),
        ErrorKind::InvalidInput,
        GateEffect::Release,
        "Method not allowed",
    ),
    Rule::new(
        Signal::Status(404),
        ErrorKind::InvalidInput,
        GateEffect::Release,
        "Not found",
    ),
    Rule::new(
        Signal::Status(400),
        ErrorKind::InvalidInput,
        GateEffect::Release,
        "Bad request",
    ),
    Rule::new(
        Signal::PayloadMessage("RateLimited"),
        ErrorKind::RateLimit,
        GateEffect::Reject(RejectionKind::Window),
        "You sent too many requests",
    ),
    Rule::new(
        Signal::AnyPayloadError,
        ErrorKind::InvalidInput,
        GateEffect::Consume,
        "ipapi.co rejected the address",
    ),
];

static PROFILE: ProviderProfile = ProviderProfile {
    name: "ipapi.co",
    table: DecisionTable::new(RULES),
    payload_error,
    limit_hints: no_limit_hints,
};

/// `{"ip": "x", "error": true, "reason": "Invalid IP Address", "message": "..."}`
fn payload_error(body: &Value) -> Option<PayloadError> {
    if body.get("error").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    let text = |key: &str| body.get(key).and_then(Value::as_str).unwrap_or_default();
    let message = match (text("reason"), text("message")) {
        (reason, "") => reason.to_string(),
        ("", message) => message.to_string(),
        (reason, message) => format!("{}: {}", reason, message),
    };
    Some(PayloadError::new(message))
}

/// Resolver for ipapi.co.
///
/// # Example
///
/// ```rust,no_run
/// use cool_ip_api::providers::IpapiCo;
/// use cool_ip_api::FullResolverExt;
///
/// let resolver = IpapiCo::new();
/// let response = resolver.lookup("8.8.8.8")?;
/// println!("{}, {}", response.city, response.country_name);
/// # Ok::<(), cool_ip_api::IpApiError>(())
/// ```
pub struct IpapiCo {
    pipeline: Pipeline,
    base_url: String,
}

impl IpapiCo {
    /// Create a resolver with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new resolver builder.
    pub fn builder() -> IpapiCoBuilder {
        IpapiCoBuilder::new()
    }

    /// The rate-limit gate guarding this resolver.
    pub fn gate(&self) -> &RateLimitGate {
        self.pipeline.gate()
    }

    fn url(&self, target: &Target) -> Result<Url, IpApiError> {
        match target.require_ip(self.pipeline.name())? {
            Some(ip) => endpoint_url(&self.base_url, &[ip.to_string().as_str(), "json", ""]),
            None => endpoint_url(&self.base_url, &["json", ""]),
        }
    }
}

impl Default for IpapiCo {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IpapiCo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpapiCo")
            .field("base_url", &self.base_url)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl FullResolver for IpapiCo {
    type Response = IpapiCoResponse;

    fn resolve(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<IpapiCoResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch_blocking(&url, options)
    }

    async fn resolve_async(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<IpapiCoResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch(&url, options).await
    }
}

/// Builder for [`IpapiCo`].
pub struct IpapiCoBuilder {
    base_url: String,
    settings: CommonSettings,
}

impl IpapiCoBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: IPAPI_CO_BASE_URL.to_string(),
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

    /// Override the default 1000 requests per day.
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.settings.policy = Some(policy);
        self
    }

    /// Build the resolver.
    pub fn build(self) -> IpapiCo {
        let policy = RateLimitPolicy::new(
            limits::ipapi_co::LIMIT_AMOUNT,
            Duration::from_secs(limits::ipapi_co::WINDOW_SECS),
        );
        IpapiCo {
            pipeline: Pipeline::new(&PROFILE, self.settings, Some(policy)),
            base_url: self.base_url,
        }
    }
}

impl Default for IpapiCoBuilder {
    fn default() -> Self {
        Self::new()
    }
}
