// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides a call-counting stub transport, test credentials, and shim builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `shimmer`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use url::Url;

use shimmer::constants::oauth_providers::{GOOGLE_FIT, RUNKEEPER};
use shimmer::models::{AccessCredential, CredentialKey};
use shimmer::providers::googlefit::{self, GoogleFitAdapter, GoogleFitShim};
use shimmer::providers::http_client::{
    HttpClient, HttpMethod, HttpRequest, HttpResponse, TransportError,
};
use shimmer::providers::runkeeper::{self, RunKeeperAdapter, RunKeeperShim};
use shimmer::providers::token::{OAuth2ClientSettings, TokenStore};

static INIT_LOGGER: Once = Once::new();

/// Token endpoint used by every test shim
pub const TEST_TOKEN_URL: &str = "https://auth.test/token";

/// Consent page used by every test shim
pub const TEST_AUTHORIZATION_URL: &str = "https://auth.test/authorize";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN, // Default to WARN for quiet tests
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync;

/// Transport double that records every request and answers from a closure
pub struct StubHttpClient {
    responder: Box<Responder>,
    delay: Option<Duration>,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
}

impl StubHttpClient {
    /// Stub answering every request with `responder`
    pub fn new(
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            delay: None,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Stub that fails the test if any request is made
    pub fn unreachable() -> Self {
        Self::new(|request| panic!("unexpected request to {}", request.url))
    }

    /// Sleep before answering, so concurrent callers overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Total number of requests executed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of token endpoint calls
    pub fn token_calls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url == TEST_TOKEN_URL)
            .count()
    }

    /// Number of data (GET) calls
    pub fn data_calls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.method == HttpMethod::Get)
            .count()
    }

    /// Snapshot of every request so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for StubHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&request)
    }
}

/// Response with `status` and a JSON body
pub fn json_response(status: u16, body: &Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

/// Client registration shared by the test shims
pub fn client_settings() -> OAuth2ClientSettings {
    OAuth2ClientSettings::new(
        "test-client",
        "test-secret-0123456789",
        "http://localhost:8083/callback",
        vec!["scope.read".to_owned()],
    )
}

/// Credential valid for another hour
pub fn valid_credential() -> AccessCredential {
    AccessCredential::new("valid-access")
        .with_refresh_token("refresh-1")
        .with_expiry(Utc::now() + ChronoDuration::hours(1))
}

/// Credential that expired an hour ago
pub fn expired_credential(refresh_token: Option<&str>) -> AccessCredential {
    let credential =
        AccessCredential::new("stale-access").with_expiry(Utc::now() - ChronoDuration::hours(1));
    match refresh_token {
        Some(token) => credential.with_refresh_token(token),
        None => credential,
    }
}

/// Store key for a Google Fit user
pub fn googlefit_key(user: &str) -> CredentialKey {
    CredentialKey::new(GOOGLE_FIT, user)
}

/// Store key for a RunKeeper user
pub fn runkeeper_key(user: &str) -> CredentialKey {
    CredentialKey::new(RUNKEEPER, user)
}

/// Google Fit shim talking to the test endpoints
pub fn googlefit_shim(store: Arc<dyn TokenStore>, http: Arc<dyn HttpClient>) -> GoogleFitShim {
    let mut endpoints = googlefit::endpoints();
    endpoints.authorization_url = TEST_AUTHORIZATION_URL.to_owned();
    endpoints.token_url = TEST_TOKEN_URL.to_owned();
    googlefit::build_shim(
        GoogleFitAdapter::new(),
        client_settings(),
        endpoints,
        store,
        http,
    )
}

/// RunKeeper shim talking to the test endpoints
pub fn runkeeper_shim(store: Arc<dyn TokenStore>, http: Arc<dyn HttpClient>) -> RunKeeperShim {
    let mut endpoints = runkeeper::endpoints();
    endpoints.authorization_url = TEST_AUTHORIZATION_URL.to_owned();
    endpoints.token_url = TEST_TOKEN_URL.to_owned();
    runkeeper::build_shim(
        RunKeeperAdapter::new(),
        client_settings(),
        endpoints,
        store,
        http,
    )
}

/// Value of query parameter `name` in `url`
pub fn query_param(url: &str, name: &str) -> Option<String> {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
