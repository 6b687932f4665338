// ABOUTME: Terminal fetch artifacts returned to shim callers
// ABOUTME: Raw or normalized response bodies and the explicit authorization-redirect outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{MappedDataPoints, NormalizedDataPoint};

/// Response body: the provider payload untouched, or normalized data points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "content", rename_all = "snake_case")]
pub enum ResponseBody {
    /// Provider payload exactly as received
    Raw(Value),
    /// Normalized points with the count of malformed records skipped
    Normalized {
        /// Points in provider order
        data_points: Vec<NormalizedDataPoint>,
        /// Malformed records that were skipped
        skipped_records: usize,
    },
}

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShimDataResponse {
    /// Shim that produced the data
    pub shim: String,
    /// When the response was assembled
    pub generated_at: DateTime<Utc>,
    /// Raw or normalized body
    pub body: ResponseBody,
    /// Provider-native cursor for the next page, when the provider pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl ShimDataResponse {
    /// Wrap an untouched provider payload
    #[must_use]
    pub fn raw(shim: impl Into<String>, payload: Value) -> Self {
        Self {
            shim: shim.into(),
            generated_at: Utc::now(),
            body: ResponseBody::Raw(payload),
            next_cursor: None,
        }
    }

    /// Wrap mapper output
    #[must_use]
    pub fn normalized(shim: impl Into<String>, mapped: MappedDataPoints) -> Self {
        Self {
            shim: shim.into(),
            generated_at: Utc::now(),
            body: ResponseBody::Normalized {
                data_points: mapped.points,
                skipped_records: mapped.skipped,
            },
            next_cursor: None,
        }
    }

    /// Attach the cursor for the next page
    #[must_use]
    pub fn with_next_cursor(mut self, next_cursor: Option<String>) -> Self {
        self.next_cursor = next_cursor;
        self
    }

    /// Normalized points, if this is a normalized response
    #[must_use]
    pub fn data_points(&self) -> Option<&[NormalizedDataPoint]> {
        match &self.body {
            ResponseBody::Normalized { data_points, .. } => Some(data_points),
            ResponseBody::Raw(_) => None,
        }
    }

    /// Raw payload, if this is a raw response
    #[must_use]
    pub const fn raw_payload(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Raw(payload) => Some(payload),
            ResponseBody::Normalized { .. } => None,
        }
    }
}

/// Where to send the user to grant (or re-grant) access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRedirect {
    /// Shim requiring authorization
    pub shim: String,
    /// User who must authorize
    pub user_key: String,
    /// Provider consent URL including state, client id, and provider extras
    pub authorization_url: String,
}

/// Outcome of a fetch: data, or a redirect the caller must act on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Data retrieved
    Data(ShimDataResponse),
    /// The user has to authorize before data can be fetched
    AuthorizationRequired(AuthorizationRedirect),
}

impl FetchOutcome {
    /// The response, if data was retrieved
    #[must_use]
    pub const fn data(&self) -> Option<&ShimDataResponse> {
        match self {
            Self::Data(response) => Some(response),
            Self::AuthorizationRequired(_) => None,
        }
    }

    /// Consume into the response, if data was retrieved
    #[must_use]
    pub fn into_data(self) -> Option<ShimDataResponse> {
        match self {
            Self::Data(response) => Some(response),
            Self::AuthorizationRequired(_) => None,
        }
    }
}
