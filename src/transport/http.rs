//! reqwest-backed transport.

use std::time::Duration;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use url::Url;

use crate::error::IpApiError;
use crate::transport::{RawResponse, RequestOptions, Transport};

/// The default HTTP transport.
///
/// Async requests go through a `reqwest_middleware` client with tracing spans.
/// The blocking client is built on first blocking use, so async-only callers
/// never spawn its background thread.
pub struct HttpTransport {
    client: ClientWithMiddleware,
    blocking: Mutex<Option<reqwest::blocking::Client>>,
    user_agent: String,
    timeout: Option<Duration>,
    proxy: Option<reqwest::Proxy>,
}

impl HttpTransport {
    /// Create a transport with default settings.
    ///
    /// Only fails if the TLS backend cannot be initialized; in that case the
    /// error is logged and requests fail when sent.
    pub fn new() -> Self {
        let user_agent = default_user_agent();
        let reqwest_client = reqwest::Client::builder()
            .default_headers(default_headers(&user_agent))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("failed to build default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self::from_parts(reqwest_client, user_agent, None, None)
    }

    /// Create a new transport builder.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    fn from_parts(
        reqwest_client: reqwest::Client,
        user_agent: String,
        timeout: Option<Duration>,
        proxy: Option<reqwest::Proxy>,
    ) -> Self {
        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Self {
            client,
            blocking: Mutex::new(None),
            user_agent,
            timeout,
            proxy,
        }
    }

    fn blocking_client(&self) -> Result<reqwest::blocking::Client, IpApiError> {
        let mut slot = self.blocking.lock();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let mut builder = reqwest::blocking::Client::builder()
            .default_headers(default_headers(&self.user_agent))
            .timeout(self.timeout);
        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(proxy.clone());
        }
        let client = builder.build()?;
        *slot = Some(client.clone());
        Ok(client)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("has_proxy", &self.proxy.is_some())
            .finish()
    }
}

impl Transport for HttpTransport {
    fn get<'a>(
        &'a self,
        url: &'a Url,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, Result<RawResponse, IpApiError>> {
        Box::pin(async move {
            let mut request = self
                .client
                .get(url.clone())
                .headers(options.headers.clone());
            if let Some(timeout) = options.timeout {
                request = request.timeout(timeout);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.text().await?;
            Ok(RawResponse {
                status,
                headers,
                body,
            })
        })
    }

    fn get_blocking(&self, url: &Url, options: &RequestOptions) -> Result<RawResponse, IpApiError> {
        let client = self.blocking_client()?;
        let mut request = client.get(url.clone()).headers(options.headers.clone());
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send()?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text()?;
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Builder for [`HttpTransport`].
pub struct HttpTransportBuilder {
    user_agent: Option<String>,
    timeout: Option<Duration>,
    proxy: Option<reqwest::Proxy>,
}

impl HttpTransportBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            user_agent: None,
            timeout: None,
            proxy: None,
        }
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set a default timeout for every request.
    ///
    /// No timeout is applied unless one is set here or per call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Route all requests through a proxy.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Build the transport.
    ///
    /// Fails if reqwest rejects the configuration, e.g. a proxy it cannot use.
    pub fn build(self) -> Result<HttpTransport, IpApiError> {
        let user_agent = self.user_agent.unwrap_or_else(default_user_agent);

        let mut builder = reqwest::Client::builder().default_headers(default_headers(&user_agent));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(proxy.clone());
        }
        let reqwest_client = builder.build()?;

        Ok(HttpTransport::from_parts(
            reqwest_client,
            user_agent,
            self.timeout,
            self.proxy,
        ))
    }
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_user_agent() -> String {
    format!("cool-ip-api/{}", env!("CARGO_PKG_VERSION"))
}

fn default_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let header_value =
        HeaderValue::from_str(user_agent).unwrap_or_else(|_| HeaderValue::from_static("cool-ip-api"));
    headers.insert(USER_AGENT, header_value);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_settings() {
        let transport = HttpTransport::builder()
            .user_agent("tests/1.0")
            .timeout(Duration::from_secs(3))
            .proxy(reqwest::Proxy::all("http://127.0.0.1:3128").unwrap())
            .build()
            .unwrap();
        assert_eq!(transport.user_agent, "tests/1.0");
        assert_eq!(transport.timeout, Some(Duration::from_secs(3)));
        assert!(transport.proxy.is_some());
    }

    #[test]
    fn test_default_transport() {
        let transport = HttpTransport::new();
        assert!(transport.user_agent.starts_with("cool-ip-api/"));
        assert_eq!(transport.timeout, None);
        assert!(transport.proxy.is_none());
    }

    #[tokio::test]
    async fn test_builder_timeout_applies_to_requests() {
        // Accept the connection but never answer.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let transport = HttpTransport::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        let err = transport
            .get(&url, &RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IpApiError::Http(_) | IpApiError::HttpMiddleware(_)
        ));
    }
}
