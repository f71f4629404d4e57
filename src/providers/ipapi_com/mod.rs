//! ipapi.com adapter.
//!
//! Free tier: 1000 requests per month per API key. Failures are reported in
//! the body of a 200 response as `{"success": false, "error": {...}}`.

mod types;

pub use types::{AddressType, IpapiComResponse, Location, SpokenLanguage};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::auth::ApiKey;
use crate::error::{ErrorKind, IpApiError};
use crate::providers::decision::{DecisionTable, GateEffect, PayloadError, Rule, Signal};
use crate::providers::endpoints::IPAPI_COM_BASE_URL;
use crate::providers::pipeline::{
    endpoint_url, no_limit_hints, with_query, CommonSettings, Pipeline, ProviderProfile,
};
use crate::rate_limit::{limits, Clock, RateLimitGate, RateLimitPolicy, RejectionKind};
use crate::resolver::FullResolver;
use crate::transport::{RequestOptions, Transport};
use crate::types::Target;
use types::IpapiComQuery;

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
        "Access key not allowed",
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
        Signal::PayloadCode(101),
        ErrorKind::Authentication,
        GateEffect::AuthFailure,
        "Missing or invalid access key",
    ),
    Rule::new(
        Signal::PayloadCode(102),
        ErrorKind::Authentication,
        GateEffect::AuthFailure,
        "Account inactive",
    ),
    Rule::new(
        Signal::PayloadCode(103),
        ErrorKind::Generic,
        GateEffect::Release,
        "Invalid API function",
    ),
    Rule::new(
        Signal::PayloadCode(104),
        ErrorKind::Quota,
        GateEffect::Reject(RejectionKind::Quota),
        "Monthly usage limit reached",
    ),
    Rule::new(
        Signal::AnyPayloadError,
        ErrorKind::InvalidInput,
        GateEffect::Consume,
        "ipapi.com rejected the request",
    ),
];

static PROFILE: ProviderProfile = ProviderProfile {
    name: "ipapi.com",
    table: DecisionTable::new(RULES),
    payload_error,
    limit_hints: no_limit_hints,
};

/// `{"success": false, "error": {"code": 104, "type": "...", "info": "..."}}`
fn payload_error(body: &Value) -> Option<PayloadError> {
    if body.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    let error = body.get("error");
    let code = error.and_then(|e| e.get("code")).and_then(Value::as_i64);
    let info = error
        .and_then(|e| e.get("info"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(PayloadError {
        code,
        message: info.to_string(),
    })
}

/// Resolver for ipapi.com.
///
/// # Example
///
/// ```rust,no_run
/// use cool_ip_api::providers::IpapiCom;
/// use cool_ip_api::{FullResolver, RequestOptions, Target};
///
/// let resolver = IpapiCom::new("my-access-key");
/// let response = resolver.resolve(&Target::Own, &RequestOptions::new())?;
/// println!("{} {}", response.location.country_flag_emoji, response.country_name);
/// # Ok::<(), cool_ip_api::IpApiError>(())
/// ```
pub struct IpapiCom {
    pipeline: Pipeline,
    base_url: String,
    api_key: ApiKey,
}

impl IpapiCom {
    /// Create a resolver with default settings.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self::builder(api_key).build()
    }

    /// Create a new resolver builder.
    pub fn builder(api_key: impl Into<ApiKey>) -> IpapiComBuilder {
        IpapiComBuilder::new(api_key)
    }

    /// The rate-limit gate guarding this resolver.
    pub fn gate(&self) -> &RateLimitGate {
        self.pipeline.gate()
    }

    fn url(&self, target: &Target) -> Result<Url, IpApiError> {
        let subject = match target.require_ip(self.pipeline.name())? {
            Some(ip) => ip.to_string(),
            None => "check".to_string(),
        };
        let url = endpoint_url(&self.base_url, &[subject.as_str()])?;
        with_query(
            url,
            &IpapiComQuery {
                access_key: self.api_key.expose(),
            },
        )
    }
}

impl std::fmt::Debug for IpapiCom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpapiCom")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl FullResolver for IpapiCom {
    type Response = IpapiComResponse;

    fn resolve(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<IpapiComResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch_blocking(&url, options)
    }

    async fn resolve_async(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<IpapiComResponse, IpApiError> {
        let url = self.url(target)?;
        self.pipeline.fetch(&url, options).await
    }
}

/// Builder for [`IpapiCom`].
pub struct IpapiComBuilder {
    base_url: String,
    api_key: ApiKey,
    settings: CommonSettings,
}

impl IpapiComBuilder {
    /// Create a new builder with default settings.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self {
            base_url: IPAPI_COM_BASE_URL.to_string(),
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

    /// Override the default 1000 requests per 30 days.
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.settings.policy = Some(policy);
        self
    }

    /// Build the resolver.
    pub fn build(self) -> IpapiCom {
        let policy = RateLimitPolicy::new(
            limits::ipapi_com::LIMIT_AMOUNT,
            Duration::from_secs(limits::ipapi_com::WINDOW_SECS),
        );
        IpapiCom {
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

    fn error_body(code: i64, info: &str) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "error": {"code": code, "type": "error", "info": info}
        })
    }

    #[test]
    fn test_url_uses_check_for_own_address() {
        let resolver = IpapiCom::new("k3y");
        assert_eq!(
            resolver.url(&Target::Own).unwrap().as_str(),
            "http://api.ipapi.com/api/check?access_key=k3y"
        );
        assert_eq!(
            resolver
                .url(&Target::parse("1.1.1.1").unwrap())
                .unwrap()
                .as_str(),
            "http://api.ipapi.com/api/1.1.1.1?access_key=k3y"
        );
        assert!(!format!("{:?}", resolver).contains("k3y"));
    }

    #[test]
    fn test_error_codes() {
        let cases = [
            (101, ErrorKind::Authentication),
            (102, ErrorKind::Authentication),
            (103, ErrorKind::Generic),
            (104, ErrorKind::Quota),
            (106, ErrorKind::InvalidInput),
        ];
        for (code, kind) in cases {
            let transport = Arc::new(MockTransport::new());
            transport.reply_json(200, &error_body(code, "nope"));
            let resolver = IpapiCom::builder("key").transport(transport).build();
            let err = resolver
                .resolve(&Target::Own, &RequestOptions::new())
                .unwrap_err();
            assert_eq!(err.kind(), kind, "code {}", code);
        }
    }

    #[test]
    fn test_quota_code_closes_gate() {
        let transport = Arc::new(MockTransport::new());
        transport.reply_json(200, &error_body(104, "Your monthly usage limit has been reached."));
        let resolver = IpapiCom::builder("key").transport(transport.clone()).build();

        let err = resolver
            .resolve(&Target::Own, &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, IpApiError::Quota(ref m) if m.contains("monthly usage")));

        let err = resolver
            .resolve(&Target::Own, &RequestOptions::new())
            .unwrap_err();
        assert!(err.is_local_rate_limit());
        assert_eq!(transport.calls(), 1);
    }
}
