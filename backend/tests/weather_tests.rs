//! Weather model and validation integration tests
//!
//! Exercises the shared request-parsing rules and the serde shapes the
//! weather endpoints rely on: provider payload decoding (including nulls)
//! and response field names.

use chrono::NaiveDate;
use serde_json::json;

use shared::models::{HourlySeries, SnapshotCoverage, SnapshotRecord};
use shared::validation::{
    clamp_date_range, normalize_plate_code, parse_bool_flag, parse_date, parse_time_fraction,
};

// ============================================================================
// Request parsing
// ============================================================================

#[test]
fn single_digit_plate_codes_are_zero_padded() {
    assert_eq!(normalize_plate_code("6"), "06");
    assert_eq!(normalize_plate_code(" 6"), "06");
    assert_eq!(normalize_plate_code("34"), "34");
}

#[test]
fn hourly_flag_accepts_the_original_truthy_spellings() {
    assert!(parse_bool_flag("true"));
    assert!(parse_bool_flag("TRUE"));
    assert!(parse_bool_flag("1"));
    assert!(parse_bool_flag("yes"));
    assert!(!parse_bool_flag("false"));
    assert!(!parse_bool_flag("0"));
    assert!(!parse_bool_flag("daily"));
}

#[test]
fn date_range_clamps_instead_of_erroring() {
    let start = parse_date("2025-01-15").unwrap();
    let end = parse_date("2025-01-10").unwrap();
    assert_eq!(clamp_date_range(start, end), (start, start));
}

#[test]
fn invalid_dates_are_rejected() {
    assert!(parse_date("2025-13-01").is_err());
    assert!(parse_date("15.01.2025").is_err());
    assert!(parse_date("").is_err());
    assert_eq!(
        parse_date("2025-01-15"),
        Ok(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
    );
}

#[test]
fn time_values_outside_the_clock_are_rejected() {
    assert!(parse_time_fraction("24:00").is_err());
    assert!(parse_time_fraction("23:60").is_err());
    assert_eq!(parse_time_fraction("13:00"), Ok(13.0));
}

// ============================================================================
// Provider payload decoding
// ============================================================================

#[test]
fn hourly_series_decodes_an_open_meteo_payload_with_nulls() {
    let payload = json!({
        "time": ["2025-01-15T00:00", "2025-01-15T01:00"],
        "temperature_2m": [2.5, null],
        "precipitation": [0.0, 0.1],
        "wind_speed_10m": [12.0, 14.0],
        "relative_humidity_2m": [81, null],
        "weather_code": [3, 61]
    });

    let series: HourlySeries = serde_json::from_value(payload).unwrap();
    assert_eq!(series.time.len(), 2);
    assert_eq!(series.temperature_2m, vec![Some(2.5), None]);
    assert_eq!(series.relative_humidity_2m, vec![Some(81), None]);
    assert_eq!(series.weather_code, Some(vec![Some(3), Some(61)]));
    // Columns the request did not ask for stay absent.
    assert!(series.apparent_temperature.is_none());
    assert!(series.visibility.is_none());
}

#[test]
fn hourly_series_tolerates_missing_columns() {
    let series: HourlySeries = serde_json::from_value(json!({})).unwrap();
    assert!(series.is_empty());
    assert!(series.temperature_2m.is_empty());
}

#[test]
fn absent_optional_columns_are_not_serialized() {
    let series = HourlySeries {
        time: vec!["2025-01-15T00:00".to_string()],
        temperature_2m: vec![Some(2.5)],
        ..Default::default()
    };

    let value = serde_json::to_value(&series).unwrap();
    let object = value.as_object().unwrap();
    assert!(object.contains_key("time"));
    assert!(!object.contains_key("weather_code"));
    assert!(!object.contains_key("cloud_cover"));
}

// ============================================================================
// Response shapes
// ============================================================================

#[test]
fn snapshot_record_serializes_with_the_api_field_names() {
    let record = SnapshotRecord {
        plate_code: "06".to_string(),
        name: "Ankara".to_string(),
        temperature: 3.0,
        apparent_temperature: 1.5,
        precipitation: 0.0,
        humidity: 60,
        wind_speed: 12.0,
        wind_direction_10m: 100.0,
        pressure_msl: 1012.0,
        visibility: 10000.0,
        cloud_cover: 30,
        weather_code: 2,
        icon: "code_2".to_string(),
        resolved_time: "2025-01-15T12:00".to_string(),
    };

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["plate_code"], "06");
    assert_eq!(value["icon"], "code_2");
    assert_eq!(value["resolved_time"], "2025-01-15T12:00");
    assert_eq!(value["wind_direction_10m"], 100.0);
}

#[test]
fn coverage_round_trips() {
    let coverage = SnapshotCoverage {
        available: 80,
        total: 81,
    };
    let value = serde_json::to_value(&coverage).unwrap();
    let back: SnapshotCoverage = serde_json::from_value(value).unwrap();
    assert_eq!(back.available, 80);
    assert_eq!(back.total, 81);
}
