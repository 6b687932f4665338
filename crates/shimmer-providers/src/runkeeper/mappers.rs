// ABOUTME: Normalization of RunKeeper fitness activity feed items
// ABOUTME: Local start time plus UTC offset to UTC intervals, activity names, and calories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use shimmer_core::constants::oauth_providers::RUNKEEPER;
use shimmer_core::errors::{ShimError, ShimResult};
use shimmer_core::models::{
    MeasureUnit, MeasureValue, Modality, NormalizedDataPoint, Provenance, TimeFrame,
};

use super::RunKeeperDataType;
use crate::catalog::ShimDataType;
use crate::mapper::{optional_f64, required_str, RecordError, RecordMapper, RecordResult};

/// Feed timestamp layout, e.g. `Tue, 17 Nov 2015 09:58:07`
const START_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// `entry_mode` of activities typed in on the website
const MANUAL_ENTRY_MODE: &str = "Web";

/// Maps the `items` array of the activity feed
#[derive(Debug, Clone, Copy)]
pub struct RunKeeperMapper {
    data_type: RunKeeperDataType,
}

impl RunKeeperMapper {
    /// Mapper for `data_type`
    #[must_use]
    pub const fn new(data_type: RunKeeperDataType) -> Self {
        Self { data_type }
    }
}

impl RecordMapper for RunKeeperMapper {
    fn provider(&self) -> &'static str {
        RUNKEEPER
    }

    fn records<'a>(&self, payload: &'a Value) -> ShimResult<&'a [Value]> {
        payload
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| ShimError::malformed(RUNKEEPER, "feed has no 'items' array"))
    }

    fn map_record(&self, record: &Value) -> RecordResult {
        let start = start_time(record)?;
        let time_frame = match optional_f64(record, "duration")? {
            Some(seconds) if seconds < 0.0 => {
                return Err(RecordError::invalid("duration", "negative duration"));
            }
            Some(seconds) => TimeFrame::from_bounds(start, end_after(start, seconds)?),
            None => TimeFrame::Instant { date_time: start },
        };

        let (value, unit) = match self.data_type {
            RunKeeperDataType::PhysicalActivity => (
                MeasureValue::Activity {
                    name: required_str(record, "type")?.to_owned(),
                    distance_meters: optional_f64(record, "total_distance")?,
                },
                MeasureUnit::Unitless,
            ),
            RunKeeperDataType::CaloriesBurned => {
                let Some(calories) = optional_f64(record, "total_calories")? else {
                    return Ok(None);
                };
                (
                    MeasureValue::Quantity { value: calories },
                    MeasureUnit::Kilocalories,
                )
            }
        };

        let modality = record
            .get("entry_mode")
            .and_then(Value::as_str)
            .filter(|mode| *mode == MANUAL_ENTRY_MODE)
            .map(|_| Modality::SelfReported);
        let external_id = record.get("uri").and_then(Value::as_str).map(str::to_owned);

        Ok(Some(NormalizedDataPoint::new(
            self.data_type.normalized_name(),
            time_frame,
            value,
            unit,
            Provenance::new(RUNKEEPER, self.data_type.stream_id())
                .with_modality(modality)
                .with_external_id(external_id),
        )))
    }
}

/// `start + seconds`, rejecting durations chrono cannot represent
fn end_after(start: DateTime<Utc>, seconds: f64) -> Result<DateTime<Utc>, RecordError> {
    let millis = (seconds * 1000.0).round();
    Some(millis)
        .filter(|millis| *millis < i64::MAX as f64)
        .and_then(|millis| Duration::try_milliseconds(millis as i64))
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(|| {
            RecordError::invalid("duration", format!("{seconds} seconds is out of range"))
        })
}

/// `start_time` is local wall-clock time; `utc_offset` is hours east of UTC
fn start_time(record: &Value) -> Result<DateTime<Utc>, RecordError> {
    let local = NaiveDateTime::parse_from_str(required_str(record, "start_time")?, START_TIME_FORMAT)
        .map_err(|e| RecordError::invalid("start_time", e.to_string()))?;
    let offset_hours = optional_f64(record, "utc_offset")?.unwrap_or(0.0);
    let offset = FixedOffset::east_opt((offset_hours * 3600.0).round() as i32)
        .ok_or_else(|| RecordError::invalid("utc_offset", "offset out of range"))?;
    offset
        .from_local_datetime(&local)
        .single()
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or_else(|| RecordError::invalid("start_time", "not representable at offset"))
}
