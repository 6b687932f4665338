// ABOUTME: Caller-constructed request for a single shim data fetch
// ABOUTME: Carries shim, user, data type key, optional bounds, normalize flag, and cursor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Request for one data type from one shim over an optional time window
///
/// Both bounds are inclusive as supplied by the caller; the shim resolves them to a
/// half-open UTC [`TimeWindow`](super::TimeWindow) before querying the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimDataRequest {
    /// Registry key of the shim (e.g. "googlefit")
    pub provider_key: String,
    /// Identifier of the user whose credential is used
    pub user_key: String,
    /// Caller-facing data type key (e.g. "step_count"), matched case-insensitively
    pub data_type_key: Option<String>,
    /// Inclusive start of the requested range
    pub start_date_time: Option<DateTime<FixedOffset>>,
    /// Inclusive end of the requested range; the whole calendar day is included
    pub end_date_time: Option<DateTime<FixedOffset>>,
    /// Return normalized data points instead of the raw provider body
    pub normalize: bool,
    /// Provider-native pagination cursor from a previous response
    pub pagination_cursor: Option<String>,
}

impl ShimDataRequest {
    /// Create a normalized request with no explicit window
    #[must_use]
    pub fn new(
        provider_key: impl Into<String>,
        user_key: impl Into<String>,
        data_type_key: impl Into<String>,
    ) -> Self {
        Self {
            provider_key: provider_key.into(),
            user_key: user_key.into(),
            data_type_key: Some(data_type_key.into()),
            start_date_time: None,
            end_date_time: None,
            normalize: true,
            pagination_cursor: None,
        }
    }

    /// Set the inclusive start bound
    #[must_use]
    pub const fn with_start(mut self, start: DateTime<FixedOffset>) -> Self {
        self.start_date_time = Some(start);
        self
    }

    /// Set the inclusive end bound
    #[must_use]
    pub const fn with_end(mut self, end: DateTime<FixedOffset>) -> Self {
        self.end_date_time = Some(end);
        self
    }

    /// Choose between normalized data points and the raw provider body
    #[must_use]
    pub const fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Continue from a provider-native pagination cursor
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.pagination_cursor = Some(cursor.into());
        self
    }
}
