//! Error types for the cool-ip-api client library.

use std::time::Duration;

use thiserror::Error;

/// The main error type for all resolver operations.
#[derive(Error, Debug)]
pub enum IpApiError {
    /// The rate limit window is exhausted, either locally or as reported by the provider.
    #[error("Rate limit exceeded ({origin}): {message}")]
    RateLimit {
        /// Human-readable reason
        message: String,
        /// Whether the call was stopped before or after reaching the network
        origin: RateLimitOrigin,
        /// Time until the local window reopens, if known
        retry_after: Option<Duration>,
    },

    /// A long-term (usually monthly) quota is exhausted
    #[error("Quota exhausted: {0}")]
    Quota(String),

    /// The API key is missing, invalid or the account is inactive
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The target address or the request itself was rejected as malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The provider answered with an error the decision table does not classify
    #[error("Provider API error: {0}")]
    Api(ApiError),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid response from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A custom transport failed before producing a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Both address families failed in combined mode
    #[error("Could not resolve any IP address (ipv4: {ipv4}; ipv6: {ipv6})")]
    CombinedFailed {
        /// Failure of the IPv4 lookup
        ipv4: Box<IpApiError>,
        /// Failure of the IPv6 lookup
        ipv6: Box<IpApiError>,
    },
}

/// The closed set of failure kinds shared by every provider.
///
/// Each kind asks the caller for a different corrective action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wait for the window to reopen and retry
    RateLimit,
    /// Do not retry soon
    Quota,
    /// Fix the credential
    Authentication,
    /// Fix the input
    InvalidInput,
    /// Unclassified upstream or transport failure
    Generic,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::RateLimit => "rate-limit",
            ErrorKind::Quota => "quota",
            ErrorKind::Authentication => "authentication",
            ErrorKind::InvalidInput => "invalid-input",
            ErrorKind::Generic => "generic",
        };
        write!(f, "{}", s)
    }
}

/// Where a rate limit was enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitOrigin {
    /// Denied by the local gate, no request was sent
    Local,
    /// Signaled by the provider's response
    Remote,
}

impl std::fmt::Display for RateLimitOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateLimitOrigin::Local => write!(f, "local"),
            RateLimitOrigin::Remote => write!(f, "remote"),
        }
    }
}

impl IpApiError {
    /// Build an error of the given kind with a message.
    ///
    /// `Generic` produces an [`ApiError`] from the raw status and body.
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>, status: u16, body: &str) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::RateLimit => IpApiError::RateLimit {
                message,
                origin: RateLimitOrigin::Remote,
                retry_after: None,
            },
            ErrorKind::Quota => IpApiError::Quota(message),
            ErrorKind::Authentication => IpApiError::Authentication(message),
            ErrorKind::InvalidInput => IpApiError::InvalidInput(message),
            ErrorKind::Generic => IpApiError::Api(ApiError::new(status, body)),
        }
    }

    /// The failure kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IpApiError::RateLimit { .. } => ErrorKind::RateLimit,
            IpApiError::Quota(_) => ErrorKind::Quota,
            IpApiError::Authentication(_) => ErrorKind::Authentication,
            IpApiError::InvalidInput(_) => ErrorKind::InvalidInput,
            _ => ErrorKind::Generic,
        }
    }

    /// Check if this is a rate limit error (local or remote).
    pub fn is_rate_limit(&self) -> bool {
        self.kind() == ErrorKind::RateLimit
    }

    /// Check if the local gate stopped the call before any network activity.
    pub fn is_local_rate_limit(&self) -> bool {
        matches!(
            self,
            IpApiError::RateLimit {
                origin: RateLimitOrigin::Local,
                ..
            }
        )
    }

    /// Check if retrying later without changing input or credentials may succeed.
    pub fn is_retryable_later(&self) -> bool {
        matches!(self.kind(), ErrorKind::RateLimit | ErrorKind::Generic)
    }
}

/// An unclassified provider failure with the raw status and body for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.body)
    }
}

impl ApiError {
    /// Create a new API error from a status code and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}
