//! Admin API Transport Layer
//!
//! The transport is responsible only for moving one request and its response
//! over the wire. Authentication, URL guarding and status handling live in
//! the client layer.

use anyhow::{Context, Result};
use reqwest::Method;
use std::time::Duration;

/// A fully resolved outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Value of header `name` (case-insensitive), last one wins
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status code and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for admin API communication
///
/// Implemented by [`HttpTransport`] and by test doubles.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Execute one request and return the raw response
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Create a transport without a client-side timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    /// Create a transport; `None` disables the client-side timeout
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, timeout })
    }

    /// Configured timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            let json = serde_json::to_string(body).context("Failed to serialize request body")?;
            builder = builder.body(json);
        }

        let response = builder
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read HTTP response body")?;

        tracing::debug!("Received HTTP {} ({} bytes)", status, body.len());
        Ok(ApiResponse { status, body })
    }
}
