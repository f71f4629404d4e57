//! HTTP transport used by every provider adapter.
//!
//! The adapters never talk to the network directly. They hand a URL and the
//! caller's [`RequestOptions`] to a [`Transport`] and get back a
//! [`RawResponse`]. The same transport serves both the blocking and the async
//! call path, so swapping it (for a mock, a proxying client, ...) affects both.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cool_ip_api::providers::IpApiCom;
//! use cool_ip_api::transport::HttpTransport;
//!
//! let transport = HttpTransport::builder()
//!     .user_agent("my-app/1.0")
//!     .timeout(Duration::from_secs(5))
//!     .build()?;
//! let provider = IpApiCom::builder().transport(Arc::new(transport)).build();
//! # Ok::<(), cool_ip_api::IpApiError>(())
//! ```

mod http;
mod mock;

pub use http::{HttpTransport, HttpTransportBuilder};
pub use mock::MockTransport;

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::IpApiError;

/// Trait for performing the single HTTP GET an adapter needs.
///
/// Implementations must not retry: one call is one request as far as the
/// provider's quota is concerned.
pub trait Transport: Send + Sync {
    /// Perform a GET request, suspending the caller's task while waiting.
    fn get<'a>(
        &'a self,
        url: &'a Url,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, Result<RawResponse, IpApiError>>;

    /// Perform a GET request, blocking the caller's thread while waiting.
    ///
    /// Must not be called from within an async runtime.
    fn get_blocking(&self, url: &Url, options: &RequestOptions) -> Result<RawResponse, IpApiError>;
}

/// Per-call passthrough options forwarded to the transport untouched.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra request headers.
    pub headers: HeaderMap,
    /// Timeout for this request only.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Status, headers and body of a provider response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Create a response without headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Add a header, ignoring names or values that are not valid HTTP.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Read a header as an unsigned integer.
    pub fn header_u64(&self, name: &str) -> Option<u64> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
}
