// ABOUTME: Normalization of Google Fit dataset points into canonical data points
// ABOUTME: Unit handling per data type, activity code names, and user-input modality detection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde_json::Value;

use shimmer_core::constants::oauth_providers::GOOGLE_FIT;
use shimmer_core::errors::{ShimError, ShimResult};
use shimmer_core::models::{
    MeasureUnit, MeasureValue, Modality, NormalizedDataPoint, Provenance, TimeFrame,
};

use super::GoogleFitDataType;
use crate::catalog::ShimDataType;
use crate::mapper::{
    nanos_field, optional_f64, required_f64, required_i64, RecordError, RecordMapper, RecordResult,
};

/// Marker Google puts in `originDataSourceId` for manually entered values
const USER_INPUT_MARKER: &str = "user_input";

/// Activity codes that describe the absence of physical activity
const NON_ACTIVITY_CODES: &[i64] = &[
    0,   // in vehicle
    3,   // still
    4,   // unknown
    5,   // tilting
    72,  // sleeping
    109, // light sleep
    110, // deep sleep
    111, // REM sleep
    112, // awake during sleep cycle
    117, // elevator
    118, // escalator
];

/// Maps the `point` array of one Google Fit dataset
#[derive(Debug, Clone, Copy)]
pub struct GoogleFitMapper {
    data_type: GoogleFitDataType,
}

impl GoogleFitMapper {
    /// Mapper for `data_type`
    #[must_use]
    pub const fn new(data_type: GoogleFitDataType) -> Self {
        Self { data_type }
    }

    fn point(
        &self,
        time_frame: TimeFrame,
        value: MeasureValue,
        unit: MeasureUnit,
        modality: Option<Modality>,
    ) -> NormalizedDataPoint {
        NormalizedDataPoint::new(
            self.data_type.normalized_name(),
            time_frame,
            value,
            unit,
            Provenance::new(GOOGLE_FIT, self.data_type.stream_id()).with_modality(modality),
        )
    }
}

impl RecordMapper for GoogleFitMapper {
    fn provider(&self) -> &'static str {
        GOOGLE_FIT
    }

    fn records<'a>(&self, payload: &'a Value) -> ShimResult<&'a [Value]> {
        let Some(dataset) = payload.as_object() else {
            return Err(ShimError::malformed(GOOGLE_FIT, "dataset is not a JSON object"));
        };
        match dataset.get("point") {
            None | Some(Value::Null) => Ok(&[]),
            Some(Value::Array(points)) => Ok(points.as_slice()),
            Some(_) => Err(ShimError::malformed(GOOGLE_FIT, "'point' is not an array")),
        }
    }

    fn map_record(&self, record: &Value) -> RecordResult {
        let start = nanos_field(record, "startTimeNanos")?;
        let end = nanos_field(record, "endTimeNanos")?;
        if end < start {
            return Err(RecordError::invalid("endTimeNanos", "ends before it starts"));
        }
        let time_frame = TimeFrame::from_bounds(start, end);
        let modality = modality_of(record);
        let values = values_of(record)?;

        let quantity = |unit: MeasureUnit| -> RecordResult {
            let value = fp_val(values, 0)?;
            Ok(Some(self.point(
                time_frame,
                MeasureValue::Quantity { value },
                unit,
                modality,
            )))
        };

        match self.data_type {
            GoogleFitDataType::BodyHeight => quantity(MeasureUnit::Meters),
            GoogleFitDataType::BodyWeight => quantity(MeasureUnit::Kilograms),
            GoogleFitDataType::CaloriesBurned => quantity(MeasureUnit::Kilocalories),
            GoogleFitDataType::HeartRate => quantity(MeasureUnit::BeatsPerMinute),
            GoogleFitDataType::Speed => quantity(MeasureUnit::MetersPerSecond),
            GoogleFitDataType::StepCount => {
                let steps = int_val(values, 0)?;
                if steps == 0 {
                    return Ok(None);
                }
                Ok(Some(self.point(
                    time_frame,
                    MeasureValue::Count { value: steps },
                    MeasureUnit::Steps,
                    modality,
                )))
            }
            GoogleFitDataType::Geoposition => {
                let position = MeasureValue::Position {
                    latitude: fp_val(values, 0)?,
                    longitude: fp_val(values, 1)?,
                    accuracy_meters: optional_fp_val(values, 2)?,
                    elevation_meters: optional_fp_val(values, 3)?,
                };
                Ok(Some(self.point(
                    time_frame,
                    position,
                    MeasureUnit::DecimalDegrees,
                    modality,
                )))
            }
            GoogleFitDataType::PhysicalActivity => {
                let code = int_val(values, 0)?;
                if NON_ACTIVITY_CODES.contains(&code) {
                    return Ok(None);
                }
                let name = activity_name(code).ok_or_else(|| {
                    RecordError::invalid("value", format!("unknown activity code {code}"))
                })?;
                Ok(Some(self.point(
                    time_frame,
                    MeasureValue::Activity {
                        name: name.to_owned(),
                        distance_meters: None,
                    },
                    MeasureUnit::Unitless,
                    modality,
                )))
            }
        }
    }
}

fn modality_of(record: &Value) -> Option<Modality> {
    record
        .get("originDataSourceId")
        .and_then(Value::as_str)
        .filter(|origin| origin.contains(USER_INPUT_MARKER))
        .map(|_| Modality::SelfReported)
}

fn values_of(record: &Value) -> Result<&[Value], RecordError> {
    match record.get("value") {
        None | Some(Value::Null) => Err(RecordError::MissingField("value")),
        Some(Value::Array(values)) if !values.is_empty() => Ok(values.as_slice()),
        Some(_) => Err(RecordError::invalid("value", "expected a non-empty array")),
    }
}

fn fp_val(values: &[Value], index: usize) -> Result<f64, RecordError> {
    let value = values
        .get(index)
        .ok_or_else(|| RecordError::invalid("value", format!("missing element {index}")))?;
    required_f64(value, "fpVal")
}

fn optional_fp_val(values: &[Value], index: usize) -> Result<Option<f64>, RecordError> {
    values
        .get(index)
        .map_or(Ok(None), |value| optional_f64(value, "fpVal"))
}

fn int_val(values: &[Value], index: usize) -> Result<i64, RecordError> {
    let value = values
        .get(index)
        .ok_or_else(|| RecordError::invalid("value", format!("missing element {index}")))?;
    required_i64(value, "intVal")
}

/// Human-readable name of a Google Fit activity type code
#[must_use]
pub fn activity_name(code: i64) -> Option<&'static str> {
    let name = match code {
        0 => "in vehicle",
        1 => "biking",
        2 => "on foot",
        3 => "still",
        4 => "unknown",
        5 => "tilting",
        7 => "walking",
        8 => "running",
        9 => "aerobics",
        10 => "badminton",
        11 => "baseball",
        12 => "basketball",
        13 => "biathlon",
        14 => "handbiking",
        15 => "mountain biking",
        16 => "road biking",
        17 => "spinning",
        18 => "stationary biking",
        19 => "utility biking",
        20 => "boxing",
        21 => "calisthenics",
        22 => "circuit training",
        23 => "cricket",
        24 => "dancing",
        25 => "elliptical",
        26 => "fencing",
        27 => "american football",
        28 => "australian football",
        29 => "soccer",
        30 => "frisbee",
        31 => "gardening",
        32 => "golf",
        33 => "gymnastics",
        34 => "handball",
        35 => "hiking",
        36 => "hockey",
        37 => "horseback riding",
        38 => "housework",
        39 => "jumping rope",
        40 => "kayaking",
        41 => "kettlebell training",
        42 => "kickboxing",
        43 => "kitesurfing",
        44 => "martial arts",
        45 => "meditation",
        46 => "mixed martial arts",
        47 => "P90X exercises",
        48 => "paragliding",
        49 => "pilates",
        50 => "polo",
        51 => "racquetball",
        52 => "rock climbing",
        53 => "rowing",
        54 => "rowing machine",
        55 => "rugby",
        56 => "jogging",
        57 => "running on sand",
        58 => "treadmill running",
        59 => "sailing",
        60 => "scuba diving",
        61 => "skateboarding",
        62 => "skating",
        63 => "cross skating",
        64 => "inline skating",
        65 => "skiing",
        66 => "back-country skiing",
        67 => "cross-country skiing",
        68 => "downhill skiing",
        69 => "kite skiing",
        70 => "roller skiing",
        71 => "sledding",
        72 => "sleeping",
        73 => "snowboarding",
        74 => "snowmobile",
        75 => "snowshoeing",
        76 => "squash",
        77 => "stair climbing",
        78 => "stair-climbing machine",
        79 => "stand-up paddleboarding",
        80 => "strength training",
        81 => "surfing",
        82 => "swimming",
        83 => "pool swimming",
        84 => "open water swimming",
        85 => "table tennis",
        86 => "team sports",
        87 => "tennis",
        88 => "treadmill",
        89 => "volleyball",
        90 => "beach volleyball",
        91 => "indoor volleyball",
        92 => "wakeboarding",
        93 => "fitness walking",
        94 => "nordic walking",
        95 => "treadmill walking",
        96 => "water polo",
        97 => "weightlifting",
        98 => "wheelchair",
        99 => "windsurfing",
        100 => "yoga",
        101 => "zumba",
        102 => "diving",
        103 => "ergometer",
        104 => "ice skating",
        105 => "indoor skating",
        106 => "curling",
        108 => "other",
        109 => "light sleep",
        110 => "deep sleep",
        111 => "REM sleep",
        112 => "awake",
        113 => "crossfit",
        114 => "HIIT",
        115 => "interval training",
        116 => "stroller walking",
        117 => "elevator",
        118 => "escalator",
        119 => "archery",
        120 => "softball",
        122 => "guided breathing",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::DataPointMapper;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn dataset(points: &Value) -> Value {
        json!({
            "minStartTimeNs": "1398902400000000000",
            "maxEndTimeNs": "1399161600000000000",
            "dataSourceId": "derived:com.google.weight:com.google.android.gms:merge_weight",
            "point": points
        })
    }

    #[test]
    fn test_body_weight_points_are_kilograms() {
        let payload = dataset(&json!([{
            "startTimeNanos": "1398902400000000000",
            "endTimeNanos": "1398902400000000000",
            "dataTypeName": "com.google.weight",
            "originDataSourceId": "raw:com.google.weight:com.google.android.apps.fitness:user_input",
            "value": [{"fpVal": 72.5}]
        }]));

        let mapped = GoogleFitMapper::new(GoogleFitDataType::BodyWeight)
            .map(&payload)
            .unwrap();
        assert_eq!(mapped.len(), 1);
        let point = &mapped.points[0];
        assert_eq!(point.data_type(), "body_weight");
        assert_eq!(point.value(), &MeasureValue::Quantity { value: 72.5 });
        assert_eq!(point.unit(), MeasureUnit::Kilograms);
        assert_eq!(point.provenance().modality, Some(Modality::SelfReported));
        assert_eq!(
            point.time_frame(),
            &TimeFrame::Instant {
                date_time: Utc.with_ymd_and_hms(2014, 5, 1, 0, 0, 0).unwrap()
            }
        );
    }

    #[test]
    fn test_step_count_interval_and_zero_filtering() {
        let payload = dataset(&json!([
            {
                "startTimeNanos": "1398902400000000000",
                "endTimeNanos": "1398906000000000000",
                "originDataSourceId": "raw:com.google.step_count.delta:com.google.android.gms:sensor",
                "value": [{"intVal": 4146}]
            },
            {
                "startTimeNanos": "1398906000000000000",
                "endTimeNanos": "1398909600000000000",
                "value": [{"intVal": 0}]
            }
        ]));

        let mapped = GoogleFitMapper::new(GoogleFitDataType::StepCount)
            .map(&payload)
            .unwrap();
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped.skipped, 0);
        let point = &mapped.points[0];
        assert_eq!(point.value(), &MeasureValue::Count { value: 4146 });
        assert_eq!(point.provenance().modality, None);
        assert!(matches!(point.time_frame(), TimeFrame::Interval { .. }));
    }

    #[test]
    fn test_geoposition_reads_four_values() {
        let payload = dataset(&json!([{
            "startTimeNanos": "1398902400000000000",
            "endTimeNanos": "1398902400000000000",
            "value": [{"fpVal": 47.6}, {"fpVal": -122.3}, {"fpVal": 12.0}, {"fpVal": 56.0}]
        }]));

        let mapped = GoogleFitMapper::new(GoogleFitDataType::Geoposition)
            .map(&payload)
            .unwrap();
        assert_eq!(
            mapped.points[0].value(),
            &MeasureValue::Position {
                latitude: 47.6,
                longitude: -122.3,
                accuracy_meters: Some(12.0),
                elevation_meters: Some(56.0),
            }
        );
    }

    #[test]
    fn test_activity_segments_filter_non_activities() {
        let segment = |code: i64| {
            json!({
                "startTimeNanos": "1398902400000000000",
                "endTimeNanos": "1398906000000000000",
                "value": [{"intVal": code}]
            })
        };
        let payload = dataset(&json!([segment(8), segment(3), segment(72), segment(999)]));

        let mapped = GoogleFitMapper::new(GoogleFitDataType::PhysicalActivity)
            .map(&payload)
            .unwrap();
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped.skipped, 1);
        assert_eq!(
            mapped.points[0].value(),
            &MeasureValue::Activity {
                name: "running".to_owned(),
                distance_meters: None
            }
        );
    }

    #[test]
    fn test_missing_point_array_is_empty_result() {
        let mapped = GoogleFitMapper::new(GoogleFitDataType::HeartRate)
            .map(&json!({"dataSourceId": "x"}))
            .unwrap();
        assert!(mapped.is_empty());
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let err = GoogleFitMapper::new(GoogleFitDataType::HeartRate)
            .map(&json!("nope"))
            .unwrap_err();
        assert!(matches!(err, ShimError::MalformedPayload { .. }));
    }

    #[test]
    fn test_inverted_point_is_skipped() {
        let payload = dataset(&json!([{
            "startTimeNanos": "1398906000000000000",
            "endTimeNanos": "1398902400000000000",
            "value": [{"fpVal": 1.2}]
        }]));
        let mapped = GoogleFitMapper::new(GoogleFitDataType::Speed)
            .map(&payload)
            .unwrap();
        assert_eq!(mapped.skipped, 1);
    }
}
