//! ipinfo.io adapter.
//!
//! Free tier: 50000 requests per month per token.

mod types;

pub use types::IpInfoResponse;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::auth::ApiKey;
use crate::error::{ErrorKind, IpApiError};
use crate::providers::decision::{DecisionTable, GateEffect, PayloadError, Rule, Signal};
use crate::providers::endpoints::IPINFO_IO_BASE_URL;
use crate::providers::pipeline::{
    endpoint_url, no_limit_hints, with_query, CommonSettings, Pipeline, ProviderProfile,
};
use crate::rate_limit::{limits, Clock, RateLimitGate, RateLimitPolicy, RejectionKind};
use crate::resolver::FullResolver;
use crate::transport::{RequestOptions, Transport};
use crate::types::Target;
use types::IpInfoQuery;

static RULES: &[Rule] = &[
    Rule::new(
        Signal::Status(429),
        ErrorKind::RateLimit,
        GateEffect::Reject(RejectionKind::Window),
        "Rate limit exceeded",
    ),
    Rule::new(
        Signal::Status(401),
        ErrorKind::Authentication,
        GateEffect::AuthFailure,
        "Invalid token",
    ),
    Rule::new(
        Signal::Status(403),
        ErrorKind::Authentication,
        GateEffect::AuthFailure,
        "Token not allowed",
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
        "Wrong IP",
    ),
    Rule::new(
        Signal::Status(405),
        ErrorKind::InvalidInput,
        GateEffect::Release,
        "Method not allowed",
    ),
];

static PROFILE: ProviderProfile = ProviderProfile {
    name: "ipinfo.io",
    table: DecisionTable::new(RULES),
    payload_error,
    limit_hints: no_limit_hints,
};

/// `{"status": 404, "error": {"title": "Wrong ip", "message": "Please provide a valid IP address"}}`
fn payload_error(body: &Value) -> Option<PayloadError> {
    let error = body.get("error")?;
    let message = match error {
        Value::String(message) => message.clone(),
        other => other
            .get("message")
            .or_else(|| other.get("title"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    };
    Some(PayloadError::new(message))
}

/// Resolver for ipinfo.io.
///
/// # Example
///
/// ```rust,no_run
/// use cool_ip_api::providers::IpInfoIo;
/// use cool_ip_api::{FullResolver, RequestOptions, Target};
///
/// # async fn run() -> cool_ip_api::Result<()> {
/// let resolver = IpInfoIo::new("my-token");
/// let response = resolver
///     .resolve_async(&Target::parse("8.8.8.8")?, &RequestOptions::new())
///     .await?;
/// if let Some(coords) = response.coordinates().transpose()? {
///     println!("{}, {}", coords.latitude, coords.longitude);
/// }
/// # Ok(())
/// # }
/// ```
pub struct IpInfoIo {
    pipeline: Pipeline,
    base_url: String,
    api_key: ApiKey,
}

impl IpInfoIo {
    /// Create a resolver with default settings.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self::builder(api_key).build()
    }

    /// Create a new resolver builder.
    pub fn builder(api_key: impl Into<ApiKey>) -> IpInfoIoBuilder {
        IpInfoIoBuilder::new(api_key)
    }

    /// The rate-limit gate guarding this resolver.
    pub fn gate(&self) -> &RateLimitGate {
        self.pipeline.gate()
    }

    fn url(&self, target: &Target) -> Result<Url, IpApiError> {
        // The bare root serves HTML to browser-like clients; /json never does.
        let subject = match target.require_ip(self.pipeline.name())? {
            Some(ip) => ip.to_string(),
            None => "json".to_string(),
        };
        let url = endpoint_url(&self.base_url, &[subject.as_str()])?;
        with_query(
            url,
            &IpInfoQuery {
                token: self.api_key.expose(),
            },
        )
    }
}

impl std::fmt::Debug for IpInfoIo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpInfoIo")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl FullResolver for IpInfoIo {
    type Response = IpInfoResponse;

    fn resolve(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<IpInfoResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch_blocking(&url, options)
    }

    async fn resolve_async(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<IpInfoResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch(&url, options).await
    }
}

/// Builder for [`IpInfoIo`].
pub struct IpInfoIoBuilder {
    base_url: String,
    api_key: ApiKey,
    settings: CommonSettings,
}

impl IpInfoIoBuilder {
    /// Create a new builder with default settings.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self {
            base_url: IPINFO_IO_BASE_URL.to_string(),
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

    /// Override the default 50000 requests per 30 days.
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.settings.policy = Some(policy);
        self
    }

    /// Build the resolver.
    pub fn build(self) -> IpInfoIo {
        let policy = RateLimitPolicy::new(
            limits::ipinfo_io::LIMIT_AMOUNT,
            Duration::from_secs(limits::ipinfo_io::WINDOW_SECS),
        );
        IpInfoIo {
            pipeline: Pipeline::new(&PROFILE, self.settings, Some(policy)),
            base_url: self.base_url,
            api_key: self.api_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_url_shapes() {
        let resolver = IpInfoIo::new("t0k");
        assert_eq!(
            resolver.url(&Target::Own).unwrap().as_str(),
            "https://ipinfo.io/json?token=t0k"
        );
        assert_eq!(
            resolver
                .url(&Target::parse("8.8.4.4").unwrap())
                .unwrap()
                .as_str(),
            "https://ipinfo.io/8.8.4.4?token=t0k"
        );
    }

    #[test]
    fn test_wrong_ip_message_is_surfaced() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(
            404,
            r#"{"status":404,"error":{"title":"Wrong ip","message":"Please provide a valid IP address"}}"#,
        );
        let resolver = IpInfoIo::builder("t").transport(transport).build();

        let err = resolver
            .resolve(&Target::Own, &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, IpApiError::InvalidInput(ref m) if m == "Please provide a valid IP address"));
        assert_eq!(resolver.gate().remaining(), Some(50_000));
    }
}
