//! Weather data models
//!
//! Field names follow the Open-Meteo variable names so the upstream payload
//! deserializes straight into these structures and no loosely-shaped JSON
//! travels past the provider client. Individual samples are `Option`
//! because the provider emits `null` for hours it has not observed yet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Coordinates;

/// Hourly series for one province over a date range.
///
/// Invariant: every metric column that is present has the same length as
/// `time`; one index across all columns describes one sampled hour. A
/// series built from an instantaneous fallback has length 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<Vec<Option<i32>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apparent_temperature: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction_10m: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_msl: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<Vec<Option<i32>>>,
}

impl HourlySeries {
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Daily series for one province over a date range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<Vec<Option<i32>>>,
}

impl DailySeries {
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Hourly or daily payload of a range response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly: Option<HourlySeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily: Option<DailySeries>,
}

/// Range weather response for a single province
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub province: String,
    pub plate_code: String,
    pub coordinates: Coordinates,
    pub timezone: String,
    pub data: WeatherData,
    pub timestamp: DateTime<Utc>,
}

/// Instantaneous conditions for one province
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub plate_code: String,
    pub name: String,
    pub temperature: f64,
    pub precipitation: f64,
    pub humidity: i32,
    pub wind_speed: f64,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apparent_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure_msl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_direction_10m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<i32>,
}

/// Instantaneous conditions for every province
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeatherList {
    pub timestamp: DateTime<Utc>,
    pub provinces: Vec<CurrentConditions>,
}

/// One province's weather resolved at a single target hour.
///
/// `resolved_time` is the timestamp of the sampled hour actually chosen,
/// which may differ from the requested time by the nearest-hour distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub plate_code: String,
    pub name: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub precipitation: f64,
    pub humidity: i32,
    pub wind_speed: f64,
    pub wind_direction_10m: f64,
    pub pressure_msl: f64,
    pub visibility: f64,
    pub cloud_cover: i32,
    pub weather_code: i32,
    pub icon: String,
    pub resolved_time: String,
}

/// How many provinces produced a resolved record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCoverage {
    pub available: usize,
    pub total: usize,
}

/// Cross-province snapshot response for a requested date and time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub requested_date: String,
    pub requested_time: String,
    pub timestamp: DateTime<Utc>,
    pub coverage: SnapshotCoverage,
    pub provinces: Vec<SnapshotRecord>,
}
