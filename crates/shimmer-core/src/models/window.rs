// ABOUTME: Resolved half-open UTC time window for provider queries
// ABOUTME: Applies default bounds, whole-day end inclusion, and exact nanosecond conversion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::ShimDataRequest;
use crate::constants::time::{DEFAULT_WINDOW_PADDING_DAYS, NANOS_PER_SECOND};
use crate::errors::{ShimError, ShimResult};

/// Half-open `[start, end)` window in UTC
///
/// Only constructible through validating constructors, so `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window from explicit UTC instants
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeWindow` if `start >= end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ShimResult<Self> {
        if start >= end {
            return Err(ShimError::invalid_window(format!(
                "start {} is not before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Resolve the window for a request relative to the current UTC day
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeWindow` if the resolved bounds are out of order or out of range
    pub fn for_request(request: &ShimDataRequest) -> ShimResult<Self> {
        Self::resolve(request.start_date_time, request.end_date_time)
    }

    /// Resolve optional caller bounds relative to the current UTC day
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeWindow` if the resolved bounds are out of order or out of range
    pub fn resolve(
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
    ) -> ShimResult<Self> {
        Self::resolve_for_day(start, end, Utc::now().date_naive())
    }

    /// Resolve optional caller bounds relative to `today`
    ///
    /// - missing start: `today 00:00 UTC - 1 day`
    /// - missing end: `today 00:00 UTC + 1 day`
    /// - supplied end `E`: `(E's calendar date + 1 day) 00:00 UTC`, so all of `E` is included
    /// - supplied start: used as given, converted to UTC
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeWindow` if the resolved bounds are out of order or out of range
    pub fn resolve_for_day(
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
        today: NaiveDate,
    ) -> ShimResult<Self> {
        let padding = Days::new(DEFAULT_WINDOW_PADDING_DAYS.unsigned_abs());

        let start = match start {
            Some(start) => start.with_timezone(&Utc),
            None => utc_midnight(today.checked_sub_days(padding))?,
        };

        let end = match end {
            Some(end) => utc_midnight(end.date_naive().checked_add_days(Days::new(1)))?,
            None => utc_midnight(today.checked_add_days(padding))?,
        };

        Self::new(start, end)
    }

    /// Inclusive start instant
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end instant
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Start instant as nanoseconds since the Unix epoch
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeWindow` if the instant does not fit in an `i64` of nanoseconds
    pub fn start_epoch_nanos(&self) -> ShimResult<i64> {
        epoch_nanos(&self.start)
    }

    /// End instant as nanoseconds since the Unix epoch
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeWindow` if the instant does not fit in an `i64` of nanoseconds
    pub fn end_epoch_nanos(&self) -> ShimResult<i64> {
        epoch_nanos(&self.end)
    }

    /// Whether `instant` falls inside `[start, end)`
    #[must_use]
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

/// Convert an instant to nanoseconds since the epoch with checked integer arithmetic
///
/// `timestamp()` floors toward negative infinity and the sub-second part is always
/// positive, so the sum is exact for instants before 1970 as well.
///
/// # Errors
///
/// Returns `InvalidTimeWindow` if the result overflows `i64`
pub fn epoch_nanos(instant: &DateTime<Utc>) -> ShimResult<i64> {
    instant
        .timestamp()
        .checked_mul(NANOS_PER_SECOND)
        .and_then(|nanos| nanos.checked_add(i64::from(instant.timestamp_subsec_nanos())))
        .ok_or_else(|| {
            ShimError::invalid_window(format!(
                "{} cannot be represented as epoch nanoseconds",
                instant.to_rfc3339()
            ))
        })
}

fn utc_midnight(date: Option<NaiveDate>) -> ShimResult<DateTime<Utc>> {
    date.map(|day| day.and_time(NaiveTime::MIN).and_utc())
        .ok_or_else(|| ShimError::invalid_window("date out of supported range"))
}
