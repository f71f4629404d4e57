//! The request path shared by every adapter.
//!
//! gate check -> transport -> classify -> settle gate -> deserialize

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, IpApiError};
use crate::providers::decision::{DecisionTable, PayloadError, Verdict};
use crate::rate_limit::{Clock, LimitHints, Permit, RateLimitGate, RateLimitPolicy, SystemClock};
use crate::transport::{HttpTransport, RawResponse, RequestOptions, Transport};

/// Static description of how a provider reports failures.
pub(crate) struct ProviderProfile {
    pub name: &'static str,
    pub table: DecisionTable,
    pub payload_error: fn(&Value) -> Option<PayloadError>,
    pub limit_hints: fn(&RawResponse) -> LimitHints,
}

/// Profiles for providers that only signal failures through the status code.
pub(crate) fn no_payload_error(_: &Value) -> Option<PayloadError> {
    None
}

/// Profiles for providers that send no limit headers.
pub(crate) fn no_limit_hints(_: &RawResponse) -> LimitHints {
    LimitHints::default()
}

/// Settings common to every adapter builder.
#[derive(Default)]
pub(crate) struct CommonSettings {
    pub transport: Option<Arc<dyn Transport>>,
    pub clock: Option<Arc<dyn Clock>>,
    pub policy: Option<RateLimitPolicy>,
}

/// Gate, transport and classification for one adapter.
pub(crate) struct Pipeline {
    profile: &'static ProviderProfile,
    gate: RateLimitGate,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    /// Assemble a pipeline; `default_policy` of `None` means the provider
    /// documents no limit.
    pub fn new(
        profile: &'static ProviderProfile,
        settings: CommonSettings,
        default_policy: Option<RateLimitPolicy>,
    ) -> Self {
        let clock = settings.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let gate = match settings.policy.or(default_policy) {
            Some(policy) => RateLimitGate::new(profile.name, policy, clock),
            None => RateLimitGate::unlimited(profile.name, clock),
        };
        let transport = settings
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));
        Self {
            profile,
            gate,
            transport,
        }
    }

    pub fn name(&self) -> &'static str {
        self.profile.name
    }

    pub fn gate(&self) -> &RateLimitGate {
        &self.gate
    }

    /// Perform one gated request, blocking.
    pub fn fetch_blocking<T>(&self, url: &Url, options: &RequestOptions) -> Result<T, IpApiError>
    where
        T: DeserializeOwned,
    {
        let permit = self.gate.check_and_consume_permission()?;
        self.log_request(url);
        let response = self.transport.get_blocking(url, options);
        self.settle(permit, response)
    }

    /// Perform one gated request without blocking.
    ///
    /// Dropping the future before it completes releases the gate reservation
    /// without recording an outcome.
    pub async fn fetch<T>(&self, url: &Url, options: &RequestOptions) -> Result<T, IpApiError>
    where
        T: DeserializeOwned,
    {
        let permit = self.gate.check_and_consume_permission()?;
        self.log_request(url);
        let response = self.transport.get(url, options).await;
        self.settle(permit, response)
    }

    fn log_request(&self, url: &Url) {
        // The query may carry an API key.
        debug!(
            provider = self.profile.name,
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            "sending request"
        );
    }

    fn settle<T>(
        &self,
        permit: Permit<'_>,
        response: Result<RawResponse, IpApiError>,
    ) -> Result<T, IpApiError>
    where
        T: DeserializeOwned,
    {
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                permit.release();
                debug!(provider = self.profile.name, error = %e, "transport failed");
                return Err(e);
            }
        };

        let payload: Option<Value> = serde_json::from_str(&response.body).ok();
        let payload_error = payload.as_ref().and_then(self.profile.payload_error);
        let verdict = self
            .profile
            .table
            .classify(response.status, payload_error.as_ref());

        let result = match verdict {
            Verdict::Success => {
                permit.record_success();
                self.decode(payload, &response)
            }
            Verdict::Failure(rule) => {
                rule.gate.apply(permit);
                debug!(
                    provider = self.profile.name,
                    status = response.status,
                    kind = %rule.kind,
                    "provider rejected request"
                );
                let message = payload_error
                    .map(|p| p.message)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| rule.message.to_string());
                Err(IpApiError::from_kind(
                    rule.kind,
                    message,
                    response.status,
                    &response.body,
                ))
            }
            Verdict::Unclassified => {
                permit.release();
                debug!(
                    provider = self.profile.name,
                    status = response.status,
                    "unclassified provider failure"
                );
                Err(IpApiError::Api(ApiError::new(
                    response.status,
                    response.body.clone(),
                )))
            }
        };

        self.gate.reconcile(&(self.profile.limit_hints)(&response));
        result
    }

    fn decode<T>(&self, payload: Option<Value>, response: &RawResponse) -> Result<T, IpApiError>
    where
        T: DeserializeOwned,
    {
        let parse_error = |e: &dyn std::fmt::Display| {
            IpApiError::InvalidResponse(format!(
                "Failed to parse {} response: {}. Body: {}",
                self.profile.name, e, response.body
            ))
        };
        let value = payload.ok_or_else(|| parse_error(&"not JSON"))?;
        serde_json::from_value(value).map_err(|e| parse_error(&e))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("provider", &self.profile.name)
            .field("gate", &self.gate)
            .finish()
    }
}

/// Append path segments to `base`, percent-encoding each one.
///
/// A trailing empty segment produces a trailing slash.
pub(crate) fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, IpApiError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| IpApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Replace the query of `url` with the serialized `query`.
pub(crate) fn with_query<Q>(mut url: Url, query: &Q) -> Result<Url, IpApiError>
where
    Q: Serialize + ?Sized,
{
    let query_string = serde_urlencoded::to_string(query)
        .map_err(|e| IpApiError::InvalidInput(e.to_string()))?;
    if query_string.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&query_string));
    }
    Ok(url)
}

/// Merge the two halves of a combined-mode lookup.
///
/// A failed half is logged and left out. Only when both fail does the lookup
/// fail, carrying both causes.
pub(crate) fn merge_combined<T, F>(
    provider: &'static str,
    ipv4: Result<T, IpApiError>,
    ipv6: Result<T, IpApiError>,
    merge: F,
) -> Result<T, IpApiError>
where
    F: FnOnce(Option<T>, Option<T>) -> T,
{
    match (ipv4, ipv6) {
        (Err(ipv4), Err(ipv6)) => {
            warn!(provider, %ipv4, %ipv6, "combined lookup failed for both address families");
            Err(IpApiError::CombinedFailed {
                ipv4: Box::new(ipv4),
                ipv6: Box::new(ipv6),
            })
        }
        (ipv4, ipv6) => {
            let ipv4 = ipv4
                .inspect_err(|e| warn!(provider, error = %e, "ipv4 lookup failed"))
                .ok();
            let ipv6 = ipv6
                .inspect_err(|e| warn!(provider, error = %e, "ipv6 lookup failed"))
                .ok();
            Ok(merge(ipv4, ipv6))
        }
    }
}
