//! Transport seam
//!
//! The traversal engine never talks to reqwest directly. Page requests are
//! plain values, responses come back fully buffered as [`RawPage`], and the
//! [`Transport`] trait is the only thing that crosses the network.

use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A request for a single page
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL of the page
    pub url: Url,
    /// Query parameters, in the order they are sent
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
}

impl PageRequest {
    /// Create a request with the given method
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a query parameter by name
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A fetched page, before any flavor-specific parsing
#[derive(Debug, Clone)]
pub struct RawPage {
    /// HTTP status code
    pub status: u16,
    /// Final URL the page was served from
    pub url: Url,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl RawPage {
    /// Create a page with a status and body and no headers
    pub fn new(status: u16, url: Url, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            url,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Whether the status code is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Read the body as UTF-8 text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| Error::decode(format!("Page body is not valid UTF-8: {e}")))
    }
}

/// Sends page requests
///
/// Implementations own connection handling and timeouts. They must return
/// [`Error::Cancelled`] rather than a page once the token has fired.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Address that page request generators build on
    fn base_url(&self) -> &Url;

    /// Send a request and buffer the response
    async fn send(&self, request: PageRequest, cancel: &CancellationToken) -> Result<RawPage>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn base_url(&self) -> &Url {
        (**self).base_url()
    }

    async fn send(&self, request: PageRequest, cancel: &CancellationToken) -> Result<RawPage> {
        (**self).send(request, cancel).await
    }
}
