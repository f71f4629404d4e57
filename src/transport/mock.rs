//! In-memory transport for tests.

use std::collections::VecDeque;

use futures_util::future::{self, BoxFuture};
use parking_lot::Mutex;
use url::Url;

use crate::error::IpApiError;
use crate::transport::{RawResponse, RequestOptions, Transport};

#[derive(Debug)]
enum Reply {
    Response(RawResponse),
    Failure(String),
}

/// A transport that replays canned responses and records every request.
///
/// Replies are consumed in order. When the queue runs dry every further call
/// fails with [`IpApiError::Transport`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use cool_ip_api::providers::IpapiCo;
/// use cool_ip_api::transport::MockTransport;
/// use cool_ip_api::{FullResolver, RequestOptions, Target};
///
/// let transport = Arc::new(MockTransport::new());
/// transport.reply(429, "Too many requests");
///
/// let provider = IpapiCo::builder().transport(transport.clone()).build();
/// let err = provider.resolve(&Target::Own, &RequestOptions::new()).unwrap_err();
/// assert!(err.is_rate_limit());
/// assert_eq!(transport.calls(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Url>>,
}

impl MockTransport {
    /// Create a mock with no queued replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body.
    pub fn reply(&self, status: u16, body: impl Into<String>) {
        self.reply_with(RawResponse::new(status, body));
    }

    /// Queue a JSON response.
    pub fn reply_json(&self, status: u16, body: &serde_json::Value) {
        self.reply(status, body.to_string());
    }

    /// Queue a fully built response.
    pub fn reply_with(&self, response: RawResponse) {
        self.replies.lock().push_back(Reply::Response(response));
    }

    /// Queue a transport failure, as if the connection could not be made.
    pub fn fail(&self, message: impl Into<String>) {
        self.replies.lock().push_back(Reply::Failure(message.into()));
    }

    /// Number of requests issued so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// URLs requested so far, oldest first.
    pub fn requested_urls(&self) -> Vec<Url> {
        self.requests.lock().clone()
    }

    fn next(&self, url: &Url) -> Result<RawResponse, IpApiError> {
        self.requests.lock().push(url.clone());
        match self.replies.lock().pop_front() {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Failure(message)) => Err(IpApiError::Transport(message)),
            None => Err(IpApiError::Transport(format!("no reply queued for {}", url))),
        }
    }
}

impl Transport for MockTransport {
    fn get<'a>(
        &'a self,
        url: &'a Url,
        _options: &'a RequestOptions,
    ) -> BoxFuture<'a, Result<RawResponse, IpApiError>> {
        Box::pin(future::ready(self.next(url)))
    }

    fn get_blocking(&self, url: &Url, _options: &RequestOptions) -> Result<RawResponse, IpApiError> {
        self.next(url)
    }
}
