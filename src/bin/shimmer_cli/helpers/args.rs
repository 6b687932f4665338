// ABOUTME: Argument parsing helpers for shimmer-cli
// ABOUTME: Date/time values for fetch windows and code/state extraction from callback URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use url::Url;

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC)
///
/// # Errors
///
/// Returns a message clap shows to the user when neither form matches
pub fn parse_date_time(value: &str) -> Result<DateTime<FixedOffset>, String> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Ok(date_time);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| {
            date.and_time(NaiveTime::MIN)
                .and_utc()
                .fixed_offset()
        })
        .map_err(|_| format!("'{value}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date"))
}

/// Code and state returned to the redirect URI
#[derive(Debug, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// Extract `code` and `state` from a pasted callback URL
///
/// # Errors
///
/// Fails if the URL is invalid, carries an OAuth `error`, or lacks code/state
pub fn parse_callback_url(value: &str) -> Result<CallbackParams> {
    let url = Url::parse(value.trim()).map_err(|e| anyhow!("invalid callback URL: {e}"))?;

    let mut code = None;
    let mut state = None;
    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => bail!("provider returned an authorization error: {value}"),
            _ => {}
        }
    }

    match (code, state) {
        (Some(code), Some(state)) => Ok(CallbackParams { code, state }),
        _ => bail!("callback URL must carry both 'code' and 'state' parameters"),
    }
}

/// Render an instant for humans
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M UTC").to_string()
}
