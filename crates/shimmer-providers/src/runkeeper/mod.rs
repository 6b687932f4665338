// ABOUTME: RunKeeper shim: fitness activity feed queries with date filters and working pagination
// ABOUTME: Feed media type negotiation, Basic client authentication, and activity/calorie mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # RunKeeper
//!
//! Both supported data types read the same feed:
//! `GET {API_URL}?noEarlierThan=yyyy-MM-dd&noLaterThan=yyyy-MM-dd&pageSize=N`.
//! Date filters are inclusive calendar days, so the exclusive window end is moved
//! back one day. The feed's `next` path is surfaced as the pagination cursor.

/// Feed item normalization
pub mod mappers;

use chrono::Days;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use shimmer_core::constants::oauth_providers::RUNKEEPER;
use shimmer_core::errors::{ShimError, ShimResult};
use shimmer_core::models::TimeWindow;

use crate::catalog::ShimDataType;
use crate::http_client::HttpClient;
use crate::mapper::DataPointMapper;
use crate::request::{DataQuery, PagingPolicy, RequestBuilder};
use crate::shim::{OAuth2Shim, ShimAdapter};
use crate::token::{
    BasicAuthEnhancer, OAuth2ClientSettings, OAuthEndpoints, TokenLifecycle, TokenStore,
};

pub use mappers::RunKeeperMapper;

/// Fitness activity feed
pub const API_URL: &str = "https://api.runkeeper.com/fitnessActivities";
/// Consent page
pub const AUTHORIZATION_URL: &str = "https://runkeeper.com/apps/authorize";
/// Token endpoint
pub const TOKEN_URL: &str = "https://runkeeper.com/apps/token";
/// Media type of the activity feed, sent as `Accept`
pub const FEED_MEDIA_TYPE: &str = "application/vnd.com.runkeeper.FitnessActivityFeed+json";
/// Default feed page size
pub const DEFAULT_PAGE_SIZE: u32 = 25;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// RunKeeper data types; both are read from the activity feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKeeperDataType {
    /// Activities with type, distance, and duration
    PhysicalActivity,
    /// Calories burned per activity
    CaloriesBurned,
}

impl ShimDataType for RunKeeperDataType {
    const ALL: &'static [Self] = &[Self::PhysicalActivity, Self::CaloriesBurned];

    fn key(self) -> &'static str {
        match self {
            Self::PhysicalActivity => "PHYSICAL_ACTIVITY",
            Self::CaloriesBurned => "CALORIES_BURNED",
        }
    }

    fn stream_id(self) -> &'static str {
        "fitnessActivities"
    }
}

/// RunKeeper endpoints
#[must_use]
pub fn endpoints() -> OAuthEndpoints {
    OAuthEndpoints::new(AUTHORIZATION_URL, TOKEN_URL)
}

/// Feed query builder and mapper selection for RunKeeper
#[derive(Debug, Clone)]
pub struct RunKeeperAdapter {
    api_url: String,
    paging: PagingPolicy,
}

impl RunKeeperAdapter {
    /// Adapter against the production feed with the default page size
    #[must_use]
    pub fn new() -> Self {
        Self::with_api_url(API_URL, DEFAULT_PAGE_SIZE)
    }

    /// Adapter against an alternate feed URL
    #[must_use]
    pub fn with_api_url(api_url: impl Into<String>, page_size: u32) -> Self {
        Self {
            api_url: api_url.into(),
            paging: PagingPolicy::enabled(page_size),
        }
    }

    fn parse_api_url(&self) -> ShimResult<Url> {
        Url::parse(&self.api_url).map_err(|e| {
            ShimError::config(format!("invalid RunKeeper API URL '{}': {e}", self.api_url))
        })
    }
}

impl Default for RunKeeperAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder for RunKeeperAdapter {
    fn paging(&self) -> PagingPolicy {
        self.paging
    }

    fn build_query(
        &self,
        stream_id: &str,
        window: &TimeWindow,
        cursor: Option<&str>,
    ) -> ShimResult<DataQuery> {
        let base = self.parse_api_url()?;

        // The feed's `next` link already carries the filters and page position
        if let Some(cursor) = cursor.filter(|_| self.paging.enabled) {
            let url = base.join(cursor).map_err(|e| {
                ShimError::invalid_cursor(RUNKEEPER, format!("unusable cursor '{cursor}': {e}"))
            })?;
            // The bearer token must only ever go to the API host
            if url.origin() != base.origin() {
                return Err(ShimError::invalid_cursor(
                    RUNKEEPER,
                    format!("cursor '{cursor}' points outside the RunKeeper API"),
                ));
            }
            return Ok(DataQuery::new(url).with_header("Accept", FEED_MEDIA_TYPE));
        }

        let first_day = window.start().date_naive();
        let last_day = window
            .end()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .filter(|day| *day >= first_day)
            .unwrap_or(first_day);

        let mut url = base.join(stream_id).map_err(|e| {
            ShimError::config(format!("invalid RunKeeper feed path '{stream_id}': {e}"))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("noEarlierThan", &first_day.format(DATE_FORMAT).to_string())
                .append_pair("noLaterThan", &last_day.format(DATE_FORMAT).to_string());
            if self.paging.enabled {
                query.append_pair("pageSize", &self.paging.page_size.to_string());
            }
        }

        Ok(DataQuery::new(url).with_header("Accept", FEED_MEDIA_TYPE))
    }
}

impl ShimAdapter for RunKeeperAdapter {
    type DataType = RunKeeperDataType;

    const KEY: &'static str = RUNKEEPER;
    const LABEL: &'static str = "RunKeeper";

    fn mapper_for(&self, data_type: RunKeeperDataType) -> Box<dyn DataPointMapper> {
        Box::new(RunKeeperMapper::new(data_type))
    }

    fn next_cursor(&self, payload: &Value) -> Option<String> {
        payload
            .get("next")
            .and_then(Value::as_str)
            .filter(|next| !next.is_empty())
            .map(str::to_owned)
    }
}

/// RunKeeper shim type
pub type RunKeeperShim = OAuth2Shim<RunKeeperAdapter>;

/// Assemble a RunKeeper shim
#[must_use]
pub fn build_shim(
    adapter: RunKeeperAdapter,
    client: OAuth2ClientSettings,
    endpoints: OAuthEndpoints,
    store: Arc<dyn TokenStore>,
    http: Arc<dyn HttpClient>,
) -> RunKeeperShim {
    let tokens = TokenLifecycle::new(
        RUNKEEPER,
        client,
        endpoints,
        store,
        Arc::clone(&http),
        Arc::new(BasicAuthEnhancer),
    );
    OAuth2Shim::new(adapter, tokens, http)
}
