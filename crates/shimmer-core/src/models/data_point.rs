// ABOUTME: Canonical normalized measurement produced by data point mappers
// ABOUTME: Time frame, typed value, unit, and provenance shared by every shim
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// When a measurement applies: a single instant or a `[start, end)` interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeFrame {
    /// Point-in-time measurement
    Instant {
        /// Measurement instant
        date_time: DateTime<Utc>,
    },
    /// Measurement accumulated over an interval
    Interval {
        /// Inclusive start
        start: DateTime<Utc>,
        /// Exclusive end
        end: DateTime<Utc>,
    },
}

impl TimeFrame {
    /// Build a time frame from provider start/end, collapsing equal bounds to an instant
    #[must_use]
    pub fn from_bounds(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start == end {
            Self::Instant { date_time: start }
        } else {
            Self::Interval { start, end }
        }
    }

    /// Instant the measurement starts at
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        match self {
            Self::Instant { date_time } => *date_time,
            Self::Interval { start, .. } => *start,
        }
    }
}

/// Typed measurement value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasureValue {
    /// Continuous quantity (weight, speed, heart rate, ...)
    Quantity {
        /// Measured amount in `unit`
        value: f64,
    },
    /// Discrete count (steps)
    Count {
        /// Counted amount
        value: i64,
    },
    /// Geographic position
    Position {
        /// Latitude in decimal degrees
        latitude: f64,
        /// Longitude in decimal degrees
        longitude: f64,
        /// Horizontal accuracy in meters
        accuracy_meters: Option<f64>,
        /// Elevation in meters
        elevation_meters: Option<f64>,
    },
    /// Named physical activity
    Activity {
        /// Human-readable activity name
        name: String,
        /// Distance covered, when the provider reports one
        distance_meters: Option<f64>,
    },
}

/// Unit of a measurement value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureUnit {
    /// Meters
    #[serde(rename = "m")]
    Meters,
    /// Kilograms
    #[serde(rename = "kg")]
    Kilograms,
    /// Kilocalories
    #[serde(rename = "kcal")]
    Kilocalories,
    /// Heart beats per minute
    #[serde(rename = "beats/min")]
    BeatsPerMinute,
    /// Meters per second
    #[serde(rename = "m/s")]
    MetersPerSecond,
    /// Steps
    #[serde(rename = "steps")]
    Steps,
    /// Decimal degrees (positions)
    #[serde(rename = "deg")]
    DecimalDegrees,
    /// Unitless values (activity names)
    #[serde(rename = "none")]
    Unitless,
}

/// How the measurement was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Recorded by a device sensor
    Sensed,
    /// Entered manually by the user
    SelfReported,
}

/// Where a data point came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Shim key of the source provider
    pub source: String,
    /// Provider-native stream the point was read from
    pub source_stream_id: String,
    /// Capture modality, when the provider exposes it
    pub modality: Option<Modality>,
    /// Provider-native record identifier, when one exists
    pub external_id: Option<String>,
}

impl Provenance {
    /// Provenance for a point read from `stream_id` of `source`
    #[must_use]
    pub fn new(source: impl Into<String>, source_stream_id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_stream_id: source_stream_id.into(),
            modality: None,
            external_id: None,
        }
    }

    /// Attach the capture modality
    #[must_use]
    pub const fn with_modality(mut self, modality: Option<Modality>) -> Self {
        self.modality = modality;
        self
    }

    /// Attach the provider-native record identifier
    #[must_use]
    pub fn with_external_id(mut self, external_id: Option<String>) -> Self {
        self.external_id = external_id;
        self
    }
}

/// Canonical measurement; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDataPoint {
    data_type: String,
    time_frame: TimeFrame,
    value: MeasureValue,
    unit: MeasureUnit,
    provenance: Provenance,
}

impl NormalizedDataPoint {
    /// Create a data point
    #[must_use]
    pub fn new(
        data_type: impl Into<String>,
        time_frame: TimeFrame,
        value: MeasureValue,
        unit: MeasureUnit,
        provenance: Provenance,
    ) -> Self {
        Self {
            data_type: data_type.into(),
            time_frame,
            value,
            unit,
            provenance,
        }
    }

    /// Normalized data type name (lowercase, e.g. "step_count")
    #[must_use]
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// When the measurement applies
    #[must_use]
    pub const fn time_frame(&self) -> &TimeFrame {
        &self.time_frame
    }

    /// Measured value
    #[must_use]
    pub const fn value(&self) -> &MeasureValue {
        &self.value
    }

    /// Unit of the value
    #[must_use]
    pub const fn unit(&self) -> MeasureUnit {
        self.unit
    }

    /// Source of the measurement
    #[must_use]
    pub const fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

/// Mapper output: ordered points plus the number of malformed records skipped
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappedDataPoints {
    /// Data points in provider order
    pub points: Vec<NormalizedDataPoint>,
    /// Records skipped because they could not be read
    pub skipped: usize,
}

impl MappedDataPoints {
    /// Number of mapped points
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no points were produced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
