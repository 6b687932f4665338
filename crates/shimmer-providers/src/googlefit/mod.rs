// ABOUTME: Google Fit shim: data source catalog, dataset query builder, and OAuth quirks
// ABOUTME: Client credentials in the token form, offline consent, and preserved refresh tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Google Fit
//!
//! Data is read from merged data sources:
//! `GET {DATA_URL}/{streamId}/datasets/{startNanos}-{endNanos}`.
//!
//! Quirks handled here:
//! - the token endpoint wants `client_id`/`client_secret` in the form body, plus
//!   `redirect_uri` when exchanging a code
//! - consent must request `access_type=offline` and `approval_prompt=force` or no
//!   refresh token is issued
//! - refresh responses omit the refresh token, which the lifecycle keeps
//! - `limit` and paging on datasets are unreliable, so paging stays disabled

/// Per-data-type normalization of dataset points
pub mod mappers;

use std::sync::Arc;
use tracing::debug;
use url::Url;

use shimmer_core::constants::oauth_providers::GOOGLE_FIT;
use shimmer_core::errors::{ShimError, ShimResult};
use shimmer_core::models::TimeWindow;

use crate::catalog::ShimDataType;
use crate::http_client::HttpClient;
use crate::mapper::DataPointMapper;
use crate::request::{DataQuery, PagingPolicy, RequestBuilder};
use crate::shim::{OAuth2Shim, ShimAdapter};
use crate::token::{
    FormCredentialsEnhancer, OAuth2ClientSettings, OAuthEndpoints, TokenLifecycle, TokenStore,
};

pub use mappers::GoogleFitMapper;

/// Dataset API base
pub const DATA_URL: &str = "https://www.googleapis.com/fitness/v1/users/me/dataSources";
/// Consent page
pub const AUTHORIZATION_URL: &str = "https://accounts.google.com/o/oauth2/auth";
/// Token endpoint
pub const TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";

/// Google Fit data types and their merged data source stream ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoogleFitDataType {
    /// Body height in meters
    BodyHeight,
    /// Body weight in kilograms
    BodyWeight,
    /// Energy expended in kilocalories
    CaloriesBurned,
    /// Location samples
    Geoposition,
    /// Heart rate in beats per minute
    HeartRate,
    /// Activity segments
    PhysicalActivity,
    /// Speed in meters per second
    Speed,
    /// Step count deltas
    StepCount,
}

impl ShimDataType for GoogleFitDataType {
    const ALL: &'static [Self] = &[
        Self::BodyHeight,
        Self::BodyWeight,
        Self::CaloriesBurned,
        Self::Geoposition,
        Self::HeartRate,
        Self::PhysicalActivity,
        Self::Speed,
        Self::StepCount,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::BodyHeight => "BODY_HEIGHT",
            Self::BodyWeight => "BODY_WEIGHT",
            Self::CaloriesBurned => "CALORIES_BURNED",
            Self::Geoposition => "GEOPOSITION",
            Self::HeartRate => "HEART_RATE",
            Self::PhysicalActivity => "PHYSICAL_ACTIVITY",
            Self::Speed => "SPEED",
            Self::StepCount => "STEP_COUNT",
        }
    }

    fn stream_id(self) -> &'static str {
        match self {
            Self::BodyHeight => "derived:com.google.height:com.google.android.gms:merge_height",
            Self::BodyWeight => "derived:com.google.weight:com.google.android.gms:merge_weight",
            Self::CaloriesBurned => {
                "derived:com.google.calories.expended:com.google.android.gms:merge_calories_expended"
            }
            Self::Geoposition => {
                "derived:com.google.location.sample:com.google.android.gms:merge_location_samples"
            }
            Self::HeartRate => {
                "derived:com.google.heart_rate.bpm:com.google.android.gms:merge_heart_rate_bpm"
            }
            Self::PhysicalActivity => {
                "derived:com.google.activity.segment:com.google.android.gms:merge_activity_segments"
            }
            Self::Speed => "derived:com.google.speed:com.google.android.gms:merge_speed",
            Self::StepCount => {
                "derived:com.google.step_count.delta:com.google.android.gms:merge_step_deltas"
            }
        }
    }
}

/// Google Fit endpoints with the offline-consent extras
#[must_use]
pub fn endpoints() -> OAuthEndpoints {
    OAuthEndpoints::new(AUTHORIZATION_URL, TOKEN_URL)
        .with_authorization_extra("access_type", "offline")
        .with_authorization_extra("approval_prompt", "force")
}

/// Dataset query builder and mapper selection for Google Fit
#[derive(Debug, Clone)]
pub struct GoogleFitAdapter {
    data_url: String,
}

impl GoogleFitAdapter {
    /// Adapter against the production dataset API
    #[must_use]
    pub fn new() -> Self {
        Self::with_data_url(DATA_URL)
    }

    /// Adapter against an alternate dataset API base
    #[must_use]
    pub fn with_data_url(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
        }
    }
}

impl Default for GoogleFitAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder for GoogleFitAdapter {
    fn paging(&self) -> PagingPolicy {
        PagingPolicy::disabled()
    }

    fn build_query(
        &self,
        stream_id: &str,
        window: &TimeWindow,
        cursor: Option<&str>,
    ) -> ShimResult<DataQuery> {
        if cursor.is_some() {
            debug!("ignoring pagination cursor; Google Fit paging is disabled");
        }

        let range = format!(
            "{}-{}",
            window.start_epoch_nanos()?,
            window.end_epoch_nanos()?
        );

        let mut url = Url::parse(&self.data_url).map_err(|e| {
            ShimError::config(format!("invalid Google Fit data URL '{}': {e}", self.data_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| ShimError::config("Google Fit data URL cannot carry a path"))?
            .pop_if_empty()
            .extend([stream_id, "datasets", range.as_str()]);

        Ok(DataQuery::new(url))
    }
}

impl ShimAdapter for GoogleFitAdapter {
    type DataType = GoogleFitDataType;

    const KEY: &'static str = GOOGLE_FIT;
    const LABEL: &'static str = "Google Fit";

    fn mapper_for(&self, data_type: GoogleFitDataType) -> Box<dyn DataPointMapper> {
        Box::new(GoogleFitMapper::new(data_type))
    }
}

/// Google Fit shim type
pub type GoogleFitShim = OAuth2Shim<GoogleFitAdapter>;

/// Assemble a Google Fit shim
#[must_use]
pub fn build_shim(
    adapter: GoogleFitAdapter,
    client: OAuth2ClientSettings,
    endpoints: OAuthEndpoints,
    store: Arc<dyn TokenStore>,
    http: Arc<dyn HttpClient>,
) -> GoogleFitShim {
    let tokens = TokenLifecycle::new(
        GOOGLE_FIT,
        client,
        endpoints,
        store,
        Arc::clone(&http),
        Arc::new(FormCredentialsEnhancer),
    );
    OAuth2Shim::new(adapter, tokens, http)
}
