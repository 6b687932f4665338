// ABOUTME: Injected HTTP transport used by shims for token and data calls
// ABOUTME: Async client trait plus a reqwest implementation over a shared pooled client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Configured timeout values for the shared client
static CLIENT_TIMEOUTS: OnceLock<(u64, u64)> = OnceLock::new();

/// Global shared HTTP client with configured timeouts
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Initialize the shared HTTP client timeout configuration
///
/// Call once at startup before any shim is built. Without it the defaults
/// (30s request timeout, 10s connect timeout) apply.
pub fn initialize_shared_client(timeout_secs: u64, connect_timeout_secs: u64) {
    let _ = CLIENT_TIMEOUTS.set((timeout_secs, connect_timeout_secs));
}

/// Get the shared pooled HTTP client
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let (timeout, connect_timeout) = CLIENT_TIMEOUTS
            .get()
            .copied()
            .unwrap_or((DEFAULT_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS));

        ClientBuilder::new()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(connect_timeout))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// HTTP verbs used by shims
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Data queries
    Get,
    /// Token endpoint calls
    Post,
}

/// Outgoing request: URL, headers, and an optional URL-encoded form body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Verb
    pub method: HttpMethod,
    /// Absolute URL including query string
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// Form fields, sent as `application/x-www-form-urlencoded` when non-empty
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    /// GET request with no headers
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            form: Vec::new(),
        }
    }

    /// POST request carrying a form body
    #[must_use]
    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            form,
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a form field, replacing any existing value for `name`
    pub fn set_form_field(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(field) = self.form.iter_mut().find(|(key, _)| key == name) {
            field.1 = value;
        } else {
            self.form.push((name.to_owned(), value));
        }
    }

    /// First header value for `name` (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Form field value for `name`
    #[must_use]
    pub fn form_field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure before any HTTP status was received (DNS, TLS, timeout, reset)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Transport capable of executing GET/POST requests
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute a request; 4xx/5xx are returned as responses, not errors
    ///
    /// # Errors
    ///
    /// Returns `TransportError` when no response was received
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `HttpClient` backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Use the process-wide shared client
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: shared_client().clone(),
        }
    }

    /// Use a specific reqwest client
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
