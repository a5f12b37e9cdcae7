//! HTTP client transport
//!
//! A reqwest-backed [`Transport`]:
//! - Base URL, timeout, user agent and default headers from configuration
//! - Optional authentication applied to every request
//! - Non-2xx responses surfaced as errors
//! - In-flight requests abandoned when the cancellation token fires
//!
//! Retries, backoff and rate limiting are left to the caller.

use super::request::{PageRequest, RawPage, Transport};
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL handed to page request generators
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("pagewalk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP transport for paginated resources
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    base_url: Url,
    authenticator: Option<Authenticator>,
}

impl HttpClient {
    /// Create a client for the given base URL with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(HttpClientConfig::builder().base_url(base_url).build())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| Error::config("HTTP client requires a base_url"))?;
        let base_url = Url::parse(base_url)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            base_url,
            authenticator: None,
        })
    }

    /// Create a client with authentication
    pub fn with_auth(config: HttpClientConfig, auth_config: AuthConfig) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.set_authenticator(Authenticator::with_client(
            auth_config,
            client.client.clone(),
        ));
        Ok(client)
    }

    /// Set the authenticator
    pub fn set_authenticator(&mut self, authenticator: Authenticator) {
        self.authenticator = Some(authenticator);
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn prepare(&self, request: PageRequest) -> reqwest::RequestBuilder {
        let mut req = self.client.request(request.method, request.url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        req
    }
}

#[async_trait]
impl Transport for HttpClient {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send(&self, request: PageRequest, cancel: &CancellationToken) -> Result<RawPage> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let method = request.method.clone();
        let mut req = self.prepare(request);

        if let Some(ref auth) = self.authenticator {
            req = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                req = auth.apply(req) => req?,
            };
        }

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            response = req.send() => response?,
        };

        let status = response.status();
        let url = response.url().clone();
        debug!("{} {} -> {}", method, url, status.as_u16());

        if !status.is_success() {
            let body = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                body = response.text() => body.unwrap_or_default(),
            };
            return Err(Error::http_status(status.as_u16(), body));
        }

        let headers = response.headers().clone();
        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            body = response.bytes() => body?,
        };

        Ok(RawPage {
            status: status.as_u16(),
            url,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .finish_non_exhaustive()
    }
}
