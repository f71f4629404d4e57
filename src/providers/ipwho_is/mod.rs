//! ipwho.is adapter.
//!
//! Free tier: 10000 requests per month, no key. Failures come back as
//! `{"success": false, "message": "..."}`.

mod types;

pub use types::{Connection, Flag, IpWhoIsResponse, Timezone};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::error::{ErrorKind, IpApiError};
use crate::providers::decision::{DecisionTable, GateEffect, PayloadError, Rule, Signal};
use crate::providers::endpoints::IPWHO_IS_BASE_URL;
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
        "ipwho.is refused the client",
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
    Rule::new(
        Signal::PayloadMessage("limit"),
        ErrorKind::Quota,
        GateEffect::Reject(RejectionKind::Quota),
        "Monthly request limit reached",
    ),
    Rule::new(
        Signal::AnyPayloadError,
        ErrorKind::InvalidInput,
        GateEffect::Consume,
        "ipwho.is rejected the address",
    ),
];

static PROFILE: ProviderProfile = ProviderProfile {
    name: "ipwho.is",
    table: DecisionTable::new(RULES),
    payload_error,
    limit_hints: no_limit_hints,
};

fn payload_error(body: &Value) -> Option<PayloadError> {
    if body.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(PayloadError::new(message))
}

/// Resolver for ipwho.is.
///
/// # Example
///
/// ```rust,no_run
/// use cool_ip_api::providers::IpWhoIs;
/// use cool_ip_api::FullResolverExt;
///
/// let resolver = IpWhoIs::new();
/// let response = resolver.lookup("8.8.4.4")?;
/// println!("{} {}", response.flag.emoji, response.connection.isp);
/// # Ok::<(), cool_ip_api::IpApiError>(())
/// ```
pub struct IpWhoIs {
    pipeline: Pipeline,
    base_url: String,
}

impl IpWhoIs {
    /// Create a resolver with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new resolver builder.
    pub fn builder() -> IpWhoIsBuilder {
        IpWhoIsBuilder::new()
    }

    /// The rate-limit gate guarding this resolver.
    pub fn gate(&self) -> &RateLimitGate {
        self.pipeline.gate()
    }

    fn url(&self, target: &Target) -> Result<Url, IpApiError> {
        let subject = target
            .require_ip(self.pipeline.name())?
            .map(|ip| ip.to_string())
            .unwrap_or_default();
        endpoint_url(&self.base_url, &[subject.as_str()])
    }
}

impl Default for IpWhoIs {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IpWhoIs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpWhoIs")
            .field("base_url", &self.base_url)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl FullResolver for IpWhoIs {
    type Response = IpWhoIsResponse;

    fn resolve(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<IpWhoIsResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch_blocking(&url, options)
    }

    async fn resolve_async(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<IpWhoIsResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch(&url, options).await
    }
}

/// Builder for [`IpWhoIs`].
pub struct IpWhoIsBuilder {
    base_url: String,
    settings: CommonSettings,
}

impl IpWhoIsBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: IPWHO_IS_BASE_URL.to_string(),
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

    /// Override the default 10000 requests per 30 days.
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.settings.policy = Some(policy);
        self
    }

    /// Build the resolver.
    pub fn build(self) -> IpWhoIs {
        let policy = RateLimitPolicy::new(
            limits::ipwho_is::LIMIT_AMOUNT,
            Duration::from_secs(limits::ipwho_is::WINDOW_SECS),
        );
        IpWhoIs {
            pipeline: Pipeline::new(&PROFILE, self.settings, Some(policy)),
            base_url: self.base_url,
        }
    }
}

impl Default for IpWhoIsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_url_shapes() {
        let resolver = IpWhoIs::new();
        assert_eq!(resolver.url(&Target::Own).unwrap().as_str(), "https://ipwho.is/");
        assert_eq!(
            resolver
                .url(&Target::parse("2606:4700:4700::1111").unwrap())
                .unwrap()
                .as_str(),
            "https://ipwho.is/2606:4700:4700::1111"
        );
    }

    #[test]
    fn test_monthly_limit_message_is_quota() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(
            200,
            r#"{"success":false,"message":"You've hit the monthly limit"}"#,
        );
        let resolver = IpWhoIs::builder().transport(transport).build();

        let err = resolver
            .resolve(&Target::Own, &RequestOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Quota);
        assert_eq!(resolver.gate().remaining(), Some(0));
    }

    #[test]
    fn test_invalid_address_message() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(
            200,
            r#"{"ip":"8.8.8","success":false,"message":"Invalid IP address"}"#,
        );
        let resolver = IpWhoIs::builder().transport(transport).build();

        let err = resolver
            .resolve(&Target::Own, &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, IpApiError::InvalidInput(ref m) if m == "Invalid IP address"));
        assert_eq!(resolver.gate().remaining(), Some(9_999));
    }
}
