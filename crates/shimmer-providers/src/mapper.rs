// ABOUTME: Contract for pure payload-to-data-point normalization
// ABOUTME: Record-level mapping with malformed-record skipping and shared JSON field readers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Point Mapping
//!
//! A [`DataPointMapper`] turns a provider payload into [`MappedDataPoints`]. Mappers
//! are pure: they never mutate the payload, never perform I/O, and return points in
//! the order the provider listed the records.
//!
//! Most shims implement [`RecordMapper`] instead, which splits the payload into
//! records and maps each record on its own. The blanket implementation then applies
//! the shared rules:
//!
//! - `Ok(Some(point))` is kept
//! - `Ok(None)` is a well-formed record without a measurement and is dropped silently
//! - `Err(_)` is a malformed record: skipped, counted, and logged at `warn`

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use shimmer_core::constants::time::NANOS_PER_SECOND;
use shimmer_core::errors::ShimResult;
use shimmer_core::models::{MappedDataPoints, NormalizedDataPoint};

/// Pure transformation of a raw provider payload into normalized points
pub trait DataPointMapper: Send + Sync {
    /// Map `payload` into data points
    ///
    /// # Errors
    ///
    /// Returns `MalformedPayload` when the payload's overall structure is unusable
    fn map(&self, payload: &Value) -> ShimResult<MappedDataPoints>;
}

/// Why a single record could not be mapped
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Required field absent or null
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    /// Field present but unreadable
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// Offending field
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

impl RecordError {
    /// Create an invalid field error
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Result of mapping one record
pub type RecordResult = Result<Option<NormalizedDataPoint>, RecordError>;

/// Record-at-a-time mapper; gets [`DataPointMapper`] through a blanket implementation
pub trait RecordMapper: Send + Sync {
    /// Shim key used in diagnostics
    fn provider(&self) -> &'static str;

    /// The records contained in `payload`, in provider order
    ///
    /// # Errors
    ///
    /// Returns `MalformedPayload` if the record list cannot be located
    fn records<'a>(&self, payload: &'a Value) -> ShimResult<&'a [Value]>;

    /// Map one record
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if the record is malformed
    fn map_record(&self, record: &Value) -> RecordResult;
}

impl<M: RecordMapper> DataPointMapper for M {
    fn map(&self, payload: &Value) -> ShimResult<MappedDataPoints> {
        let records = self.records(payload)?;
        let mut mapped = MappedDataPoints {
            points: Vec::with_capacity(records.len()),
            skipped: 0,
        };

        for (index, record) in records.iter().enumerate() {
            match self.map_record(record) {
                Ok(Some(point)) => mapped.points.push(point),
                Ok(None) => {}
                Err(e) => {
                    mapped.skipped += 1;
                    warn!(
                        provider = self.provider(),
                        record_index = index,
                        error = %e,
                        "skipping malformed record"
                    );
                }
            }
        }

        Ok(mapped)
    }
}

/// Required string field
///
/// # Errors
///
/// Returns `RecordError` if the field is missing or not a string
pub fn required_str<'a>(record: &'a Value, field: &'static str) -> Result<&'a str, RecordError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(RecordError::MissingField(field)),
        Some(value) => value
            .as_str()
            .ok_or_else(|| RecordError::invalid(field, "expected a string")),
    }
}

/// Required numeric field
///
/// # Errors
///
/// Returns `RecordError` if the field is missing or not a number
pub fn required_f64(record: &Value, field: &'static str) -> Result<f64, RecordError> {
    optional_f64(record, field)?.ok_or(RecordError::MissingField(field))
}

/// Optional numeric field; present-but-non-numeric is an error
///
/// # Errors
///
/// Returns `RecordError` if the field is present but not a finite number
pub fn optional_f64(record: &Value, field: &'static str) -> Result<Option<f64>, RecordError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .filter(|number| number.is_finite())
            .map(Some)
            .ok_or_else(|| RecordError::invalid(field, "expected a number")),
    }
}

/// Required integer field
///
/// # Errors
///
/// Returns `RecordError` if the field is missing or not an integer
pub fn required_i64(record: &Value, field: &'static str) -> Result<i64, RecordError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(RecordError::MissingField(field)),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| RecordError::invalid(field, "expected an integer")),
    }
}

/// Epoch-nanosecond timestamp sent either as a JSON string or a number
///
/// # Errors
///
/// Returns `RecordError` if the field is missing, unparseable, or out of range
pub fn nanos_field(record: &Value, field: &'static str) -> Result<DateTime<Utc>, RecordError> {
    let nanos = match record.get(field) {
        None | Some(Value::Null) => return Err(RecordError::MissingField(field)),
        Some(Value::String(text)) => text
            .parse::<i64>()
            .map_err(|e| RecordError::invalid(field, e.to_string()))?,
        Some(value) => value
            .as_i64()
            .ok_or_else(|| RecordError::invalid(field, "expected integer nanoseconds"))?,
    };
    datetime_from_nanos(nanos).ok_or_else(|| RecordError::invalid(field, "timestamp out of range"))
}

/// Convert epoch nanoseconds to a UTC instant
#[must_use]
pub fn datetime_from_nanos(nanos: i64) -> Option<DateTime<Utc>> {
    let seconds = nanos.div_euclid(NANOS_PER_SECOND);
    let subsec = u32::try_from(nanos.rem_euclid(NANOS_PER_SECOND)).ok()?;
    DateTime::from_timestamp(seconds, subsec)
}
