//! HTTP handlers for the weather endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use shared::validation::parse_bool_flag;

use crate::error::AppResult;
use crate::models::{CurrentWeatherList, SnapshotResponse, WeatherResponse};
use crate::AppState;

/// Query parameters for the range weather endpoint
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub province: String,
    pub start_date: String,
    pub end_date: Option<String>,
    /// `true`/`1`/`yes` selects hourly data, anything else daily
    pub hourly: Option<String>,
}

/// Range weather for a single province
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> AppResult<Json<WeatherResponse>> {
    let hourly = query.hourly.as_deref().map(parse_bool_flag).unwrap_or(true);

    let payload = state
        .weather
        .get_range(
            &query.province,
            &query.start_date,
            query.end_date.as_deref(),
            hourly,
        )
        .await?;
    Ok(Json(payload))
}

/// Instantaneous conditions for all provinces
pub async fn get_current_weather(
    State(state): State<AppState>,
) -> AppResult<Json<CurrentWeatherList>> {
    let payload = state.weather.get_current_all().await?;
    Ok(Json(payload))
}

/// Query parameters for the snapshot endpoint
#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub date: String,
    pub time: String,
}

/// Nearest-hour snapshot for all provinces at a date and time
pub async fn get_weather_snapshot(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> AppResult<Json<SnapshotResponse>> {
    let payload = state.weather.get_snapshot(&query.date, &query.time).await?;
    Ok(Json(payload))
}
