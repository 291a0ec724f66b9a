use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder};
use skysync_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use skysync_domain::SkySyncError;
use tracing::debug;

use crate::errors::to_domain;

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code
    pub status: u16,
    /// Whole body as text
    pub body: String,
}

/// HTTP client with a request timeout and per-request debug logging.
///
/// Each call makes exactly one network attempt; callers own any retry
/// policy.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Fails when the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, SkySyncError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request and read the whole body as text.
    ///
    /// Any HTTP status is a successful exchange. Transport failures map to
    /// `SkySyncError::Network`.
    ///
    /// # Errors
    /// Returns `SkySyncError::InvalidInput` for a request that cannot be
    /// built and `SkySyncError::Network` or `SkySyncError::Decode` when the
    /// exchange does not complete.
    pub async fn send(&self, builder: RequestBuilder) -> Result<HttpReply, SkySyncError> {
        let request = builder.build().map_err(to_domain)?;

        let method = request.method().clone();
        let url = redact_query(request.url());
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            to_domain(err)
        })?;

        let status = response.status();
        debug!(%method, %url, %status, "received HTTP response");

        let body = response.text().await.map_err(to_domain)?;

        Ok(HttpReply { status: status.as_u16(), body })
    }
}

/// URL without its query string, for logs.
fn redact_query(url: &reqwest::Url) -> String {
    let mut shown = url.clone();
    if shown.query().is_some() {
        shown.set_query(Some("redacted"));
    }
    shown.to_string()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: Some(concat!("skysync/", env!("CARGO_PKG_VERSION")).to_string()),
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout covering connect, send and body read.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the default `skysync/<version>` agent.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers sent with every request.
    #[must_use]
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Finish the client.
    ///
    /// # Errors
    /// Fails when reqwest cannot build the client.
    pub fn build(self) -> Result<HttpClient, SkySyncError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(to_domain)?;

        Ok(HttpClient { client })
    }
}
