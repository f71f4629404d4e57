//! ip-api.com adapter.
//!
//! Free tier: 45 requests per minute per client IP, no key, no commercial use.
//! The provider reports the remaining quota in `X-Rl` and the seconds until
//! the window resets in `X-Ttl`; both are fed back into the gate.

mod types;

pub use types::{IpApiComResponse, Language, QueryStatus};

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::error::{ErrorKind, IpApiError};
use crate::providers::decision::{DecisionTable, GateEffect, PayloadError, Rule, Signal};
use crate::providers::endpoints::{IP_API_COM_ALL_FIELDS, IP_API_COM_BASE_URL};
use crate::providers::pipeline::{endpoint_url, with_query, CommonSettings, Pipeline, ProviderProfile};
use crate::rate_limit::{limits, Clock, LimitHints, RateLimitGate, RateLimitPolicy, RejectionKind};
use crate::resolver::FullResolver;
use crate::transport::{RawResponse, RequestOptions, Transport};
use crate::types::Target;
use types::IpApiComQuery;

static RULES: &[Rule] = &[
    Rule::new(
        Signal::Status(429),
        ErrorKind::RateLimit,
        GateEffect::Reject(RejectionKind::Window),
        "ip-api.com rate limit exceeded",
    ),
    Rule::new(
        Signal::Status(403),
        ErrorKind::Authentication,
        GateEffect::AuthFailure,
        "ip-api.com refused the client",
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
        Signal::AnyPayloadError,
        ErrorKind::InvalidInput,
        GateEffect::Consume,
        "ip-api.com could not resolve the query",
    ),
    Rule::new(
        Signal::AnyFailureStatus,
        ErrorKind::Generic,
        GateEffect::Reject(RejectionKind::Window),
        "ip-api.com request failed",
    ),
];

static PROFILE: ProviderProfile = ProviderProfile {
    name: "ip-api.com",
    table: DecisionTable::new(RULES),
    payload_error,
    limit_hints,
};

/// `{"status": "fail", "message": "private range"}`
fn payload_error(body: &Value) -> Option<PayloadError> {
    if body.get("status").and_then(Value::as_str) != Some("fail") {
        return None;
    }
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(PayloadError::new(message))
}

/// `X-Rl` is the number of calls left, `X-Ttl` the seconds until the window resets.
fn limit_hints(response: &RawResponse) -> LimitHints {
    LimitHints {
        remaining: response
            .header_u64("x-rl")
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
        reset_in: response
            .header_u64("x-ttl")
            .map(std::time::Duration::from_secs),
    }
}

/// Resolver for ip-api.com.
///
/// The only provider that also resolves host names.
///
/// # Example
///
/// ```rust,no_run
/// use cool_ip_api::providers::{IpApiCom, Language};
/// use cool_ip_api::{FullResolver, RequestOptions, Target};
///
/// let resolver = IpApiCom::builder().language(Language::De).build();
/// let response = resolver.resolve(&Target::parse("1.1.1.1")?, &RequestOptions::new())?;
/// println!("{} ({})", response.country, response.isp);
/// # Ok::<(), cool_ip_api::IpApiError>(())
/// ```
pub struct IpApiCom {
    pipeline: Pipeline,
    base_url: String,
    language: Language,
}

impl IpApiCom {
    /// Create a resolver with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new resolver builder.
    pub fn builder() -> IpApiComBuilder {
        IpApiComBuilder::new()
    }

    /// The rate-limit gate guarding this resolver.
    pub fn gate(&self) -> &RateLimitGate {
        self.pipeline.gate()
    }

    /// The response language.
    pub fn language(&self) -> Language {
        self.language
    }

    fn url(&self, target: &Target) -> Result<Url, IpApiError> {
        let subject = target.to_string();
        let url = endpoint_url(&self.base_url, &["json", subject.as_str()])?;
        with_query(
            url,
            &IpApiComQuery {
                fields: IP_API_COM_ALL_FIELDS,
                lang: self.language,
            },
        )
    }
}

impl Default for IpApiCom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IpApiCom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpApiCom")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl FullResolver for IpApiCom {
    type Response = IpApiComResponse;

    fn resolve(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<IpApiComResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch_blocking(&url, options)
    }

    async fn resolve_async(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<IpApiComResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch(&url, options).await
    }
}

/// Builder for [`IpApiCom`].
pub struct IpApiComBuilder {
    base_url: String,
    language: Language,
    settings: CommonSettings,
}

impl IpApiComBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: IP_API_COM_BASE_URL.to_string(),
            language: Language::default(),
            settings: CommonSettings::default(),
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the response language.
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
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

    /// Override the default 45 requests per minute.
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.settings.policy = Some(policy);
        self
    }

    /// Build the resolver.
    pub fn build(self) -> IpApiCom {
        let policy = RateLimitPolicy::new(
            limits::ip_api_com::LIMIT_AMOUNT,
            std::time::Duration::from_secs(limits::ip_api_com::WINDOW_SECS),
        );
        IpApiCom {
            pipeline: Pipeline::new(&PROFILE, self.settings, Some(policy)),
            base_url: self.base_url,
            language: self.language,
        }
    }
}

impl Default for IpApiComBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, RawResponse};

    #[test]
    fn test_url_shapes() {
        let resolver = IpApiCom::builder().language(Language::PtBr).build();
        assert_eq!(
            resolver.url(&Target::Own).unwrap().as_str(),
            "http://ip-api.com/json/?fields=66846719&lang=pt-BR"
        );
        assert_eq!(
            resolver
                .url(&Target::Host("example.com".into()))
                .unwrap()
                .as_str(),
            "http://ip-api.com/json/example.com?fields=66846719&lang=pt-BR"
        );
    }

    #[test]
    fn test_fail_payload_is_invalid_input() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(
            200,
            r#"{"status":"fail","message":"private range","query":"10.0.0.1"}"#,
        );
        let resolver = IpApiCom::builder().transport(transport).build();

        let err = resolver
            .resolve(&Target::parse("10.0.0.1").unwrap(), &RequestOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("private range"));
    }

    #[test]
    fn test_limit_headers_lower_remaining() {
        let transport = Arc::new(MockTransport::new());
        transport.reply_with(
            RawResponse::new(
                200,
                r#"{"status":"fail","message":"reserved range","query":"240.0.0.1"}"#,
            )
            .with_header("X-Rl", "3")
            .with_header("X-Ttl", "20"),
        );
        let resolver = IpApiCom::builder().transport(transport).build();

        let _ = resolver.resolve(&Target::Own, &RequestOptions::new());
        assert_eq!(resolver.gate().remaining(), Some(3));
    }

    #[test]
    fn test_limit_hints_from_headers() {
        let response = RawResponse::new(200, "{}")
            .with_header("X-Rl", " 0 ")
            .with_header("X-Ttl", "42");
        let hints = limit_hints(&response);
        assert_eq!(hints.remaining, Some(0));
        assert_eq!(hints.reset_in, Some(std::time::Duration::from_secs(42)));

        let hints = limit_hints(&RawResponse::new(200, "{}").with_header("X-Rl", "many"));
        assert!(hints.is_empty());
    }

    #[test]
    fn test_server_error_closes_window() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(503, "Service Unavailable");
        let resolver = IpApiCom::builder().transport(transport.clone()).build();

        let err = resolver
            .resolve(&Target::Own, &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, IpApiError::Api(ref api) if api.status == 503));

        let err = resolver
            .resolve(&Target::Own, &RequestOptions::new())
            .unwrap_err();
        assert!(err.is_local_rate_limit());
        assert_eq!(transport.calls(), 1);
    }
}
