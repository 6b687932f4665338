// ABOUTME: Translation of a generic (stream, window, cursor) query into a provider-native request
// ABOUTME: RequestBuilder contract, built DataQuery, and per-shim paging policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use shimmer_core::errors::ShimResult;
use shimmer_core::models::TimeWindow;

use crate::http_client::HttpRequest;

/// Whether and how a shim asks the provider for pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingPolicy {
    /// Send limit/page parameters and honor provider cursors
    pub enabled: bool,
    /// Records per page when enabled
    pub page_size: u32,
}

impl PagingPolicy {
    /// No paging parameters are sent; the provider returns its full result
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            page_size: 0,
        }
    }

    /// Request pages of `page_size` records
    #[must_use]
    pub const fn enabled(page_size: u32) -> Self {
        Self {
            enabled: true,
            page_size,
        }
    }
}

/// A fully built provider data query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQuery {
    /// Absolute URL including the window and paging parameters
    pub url: String,
    /// Extra headers the provider requires (the bearer token is added by the shim)
    pub headers: Vec<(String, String)>,
}

impl DataQuery {
    /// Query with no extra headers
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Authenticated GET for this query
    #[must_use]
    pub fn into_request(self, authorization: String) -> HttpRequest {
        let mut request = HttpRequest::get(self.url).with_header("Authorization", authorization);
        request.headers.extend(self.headers);
        request
    }
}

/// Builds provider-native data queries
pub trait RequestBuilder: Send + Sync {
    /// Paging policy applied by this builder
    fn paging(&self) -> PagingPolicy;

    /// Build the query for `stream_id` over `window`, continuing from `cursor` if given
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeWindow` if the window cannot be expressed in provider
    /// units, or `Configuration` if the base URL is invalid
    fn build_query(
        &self,
        stream_id: &str,
        window: &TimeWindow,
        cursor: Option<&str>,
    ) -> ShimResult<DataQuery>;
}
