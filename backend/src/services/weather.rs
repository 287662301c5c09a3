//! Weather aggregation engine
//!
//! Coordinates the upstream fallback chain, the bounded fan-out across all
//! provinces, the nearest-hour snapshot resolution and the four caches.
//! Per-province failures inside a fan-out are absorbed and only reflected
//! in the coverage count; they never fail the whole batch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use futures_util::future::join_all;
use tokio::sync::Semaphore;

use shared::models::{
    CurrentConditions, CurrentWeatherList, HourlySeries, Province, SnapshotCoverage,
    SnapshotRecord, SnapshotResponse, WeatherData, WeatherResponse,
};
use shared::types::Coordinates;
use shared::validation::{
    clamp_date_range, extract_hour_fraction, normalize_plate_code, parse_date, parse_time_fraction,
};

use crate::error::{AppError, AppResult};
use crate::external::open_meteo::{CallOptions, CurrentSample, OpenMeteoClient, RangeResponse};
use crate::external::open_meteo::TIMEZONE;
use crate::services::cache::TtlCache;
use crate::services::geo::ProvinceDirectory;

const RANGE_CACHE_TTL: Duration = Duration::from_secs(900);
const RANGE_CACHE_CAPACITY: usize = 512;
const CURRENT_CACHE_TTL: Duration = Duration::from_secs(900);
const SNAPSHOT_CACHE_TTL: Duration = Duration::from_secs(900);
const SNAPSHOT_HOURLY_CACHE_TTL: Duration = Duration::from_secs(21_600);
const SNAPSHOT_HOURLY_CACHE_CAPACITY: usize = 6;
const SNAPSHOT_FETCH_TIMEOUT: Duration = Duration::from_millis(6_500);
const SNAPSHOT_CURRENT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONCURRENT_REQUESTS: usize = 10;

/// Full-day hourly series for one province, as assembled by a snapshot
/// fan-out.
#[derive(Debug, Clone)]
pub(crate) struct ProvinceHourly {
    pub plate_code: String,
    pub name: String,
    pub hourly: HourlySeries,
}

/// Result of one snapshot fan-out. `total` counts every province that was
/// attempted so callers can report coverage.
#[derive(Debug, Clone)]
pub(crate) struct ProvinceHourlyBatch {
    pub provinces: Vec<ProvinceHourly>,
    pub total: usize,
}

/// Call-site tuning for the fallback chain.
///
/// The single-province range path runs with client defaults and a humidity
/// default of 50; snapshot batches bound each call tighter and default
/// humidity to 0, matching the per-call-site constants of the API.
#[derive(Debug, Clone)]
struct FallbackOptions {
    range_call: CallOptions,
    current_call: CallOptions,
    default_humidity: i32,
    default_time: String,
}

impl FallbackOptions {
    fn single_range() -> Self {
        Self {
            range_call: CallOptions::default(),
            current_call: CallOptions::default(),
            default_humidity: 50,
            default_time: Local::now().format("%Y-%m-%dT%H:%M").to_string(),
        }
    }

    fn snapshot_batch(date: &str) -> Self {
        Self {
            range_call: CallOptions::bounded(SNAPSHOT_FETCH_TIMEOUT, 0),
            current_call: CallOptions::bounded(SNAPSHOT_CURRENT_TIMEOUT, 0),
            default_humidity: 0,
            default_time: format!("{date}T00:00"),
        }
    }
}

/// Weather aggregation service owning the upstream client and the caches
pub struct WeatherService {
    client: OpenMeteoClient,
    geo: Arc<ProvinceDirectory>,
    range_cache: TtlCache<String, WeatherResponse>,
    current_cache: TtlCache<(), CurrentWeatherList>,
    snapshot_cache: TtlCache<String, SnapshotResponse>,
    snapshot_hourly_cache: TtlCache<String, ProvinceHourlyBatch>,
}

impl WeatherService {
    pub fn new(client: OpenMeteoClient, geo: Arc<ProvinceDirectory>) -> Self {
        Self {
            client,
            geo,
            range_cache: TtlCache::new(RANGE_CACHE_TTL, RANGE_CACHE_CAPACITY),
            current_cache: TtlCache::new(CURRENT_CACHE_TTL, 1),
            snapshot_cache: TtlCache::new(SNAPSHOT_CACHE_TTL, 1),
            snapshot_hourly_cache: TtlCache::new(
                SNAPSHOT_HOURLY_CACHE_TTL,
                SNAPSHOT_HOURLY_CACHE_CAPACITY,
            ),
        }
    }

    /// Range weather for a single province.
    ///
    /// A missing end date defaults to the start date; an end date before
    /// the start date is clamped up to it.
    pub async fn get_range(
        &self,
        province_code: &str,
        start_date: &str,
        end_date: Option<&str>,
        hourly: bool,
    ) -> AppResult<WeatherResponse> {
        let plate = normalize_plate_code(province_code);
        let province = self
            .geo
            .by_code(&plate)
            .ok_or_else(|| AppError::NotFound(format!("Province {}", plate)))?;
        let coordinates = province.coordinates().ok_or_else(|| {
            AppError::Configuration(format!("Province {} has no coordinates", plate))
        })?;

        let start = parse_date(start_date).map_err(|message_tr| AppError::Validation {
            field: "start_date".to_string(),
            message: "Date must be in YYYY-MM-DD format".to_string(),
            message_tr: message_tr.to_string(),
        })?;
        let end = match end_date {
            Some(value) => parse_date(value).map_err(|message_tr| AppError::Validation {
                field: "end_date".to_string(),
                message: "Date must be in YYYY-MM-DD format".to_string(),
                message_tr: message_tr.to_string(),
            })?,
            None => start,
        };
        let (start, end) = clamp_date_range(start, end);

        let cache_key = format!("{}|{}|{}|{}", plate, start, end, hourly);
        if let Some(cached) = self.range_cache.get(&cache_key) {
            tracing::debug!("Range cache hit: {}", cache_key);
            return Ok(cached);
        }

        let data = self
            .fetch_range_with_fallback(coordinates, start, end, hourly, &FallbackOptions::single_range())
            .await?;

        let payload = WeatherResponse {
            province: province.name.clone(),
            plate_code: plate,
            coordinates,
            timezone: TIMEZONE.to_string(),
            data,
            timestamp: Utc::now(),
        };
        self.range_cache.insert(cache_key, payload.clone());
        Ok(payload)
    }

    /// Instantaneous conditions for every province
    pub async fn get_current_all(&self) -> AppResult<CurrentWeatherList> {
        if let Some(cached) = self.current_cache.get(&()) {
            tracing::debug!("Current weather cache hit");
            return Ok(cached);
        }

        let provinces = self.geo.all().to_vec();
        let today = Local::now().date_naive();

        let outcomes = fan_out(provinces, MAX_CONCURRENT_REQUESTS, |province| async move {
            self.fetch_current_for(province, today).await
        })
        .await;

        let payload = CurrentWeatherList {
            timestamp: Utc::now(),
            provinces: outcomes.into_iter().flatten().collect(),
        };
        self.current_cache.insert((), payload.clone());
        Ok(payload)
    }

    /// Nearest-hour snapshot across every province for a date and time
    pub async fn get_snapshot(&self, date: &str, time: &str) -> AppResult<SnapshotResponse> {
        let target_date = parse_date(date).map_err(|message_tr| AppError::Validation {
            field: "date".to_string(),
            message: "Date must be in YYYY-MM-DD format".to_string(),
            message_tr: message_tr.to_string(),
        })?;

        let today = Local::now().date_naive();
        if target_date > today {
            return Err(AppError::Validation {
                field: "date".to_string(),
                message: "A future date cannot be requested".to_string(),
                message_tr: "Gelecek tarih secilemez".to_string(),
            });
        }

        let target_hour = parse_time_fraction(time).map_err(|message_tr| AppError::Validation {
            field: "time".to_string(),
            message: "Time must be HH:MM with hour 0-23 and minute 0-59".to_string(),
            message_tr: message_tr.to_string(),
        })?;

        let cache_key = format!("{}|{}", date, time);
        if let Some(cached) = self.snapshot_cache.get(&cache_key) {
            tracing::debug!("Snapshot cache hit: {}", cache_key);
            return Ok(cached);
        }

        let batch = match self.snapshot_hourly_cache.get(&date.to_string()) {
            Some(batch) => batch,
            None => {
                let batch = self.build_snapshot_hourly(date, target_date).await;
                self.snapshot_hourly_cache.insert(date.to_string(), batch.clone());
                batch
            }
        };

        let mut records = Vec::new();
        for item in &batch.provinces {
            if item.hourly.time.is_empty() {
                continue;
            }

            let index = resolve_best_hour_index(&item.hourly.time, target_hour);
            let Some(temperature) = series_value(&item.hourly.temperature_2m, index) else {
                continue;
            };
            let weather_code = column_value(item.hourly.weather_code.as_ref(), index).unwrap_or(0);

            records.push(SnapshotRecord {
                plate_code: item.plate_code.clone(),
                name: item.name.clone(),
                temperature,
                apparent_temperature: column_value(item.hourly.apparent_temperature.as_ref(), index)
                    .unwrap_or(temperature),
                precipitation: series_value(&item.hourly.precipitation, index).unwrap_or(0.0),
                humidity: series_value(&item.hourly.relative_humidity_2m, index).unwrap_or(0),
                wind_speed: series_value(&item.hourly.wind_speed_10m, index).unwrap_or(0.0),
                wind_direction_10m: column_value(item.hourly.wind_direction_10m.as_ref(), index)
                    .unwrap_or(0.0),
                pressure_msl: column_value(item.hourly.pressure_msl.as_ref(), index).unwrap_or(0.0),
                visibility: column_value(item.hourly.visibility.as_ref(), index).unwrap_or(0.0),
                cloud_cover: column_value(item.hourly.cloud_cover.as_ref(), index).unwrap_or(0),
                weather_code,
                icon: format!("code_{}", weather_code),
                resolved_time: item
                    .hourly
                    .time
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("{date}T00:00")),
            });
        }

        let payload = SnapshotResponse {
            requested_date: date.to_string(),
            requested_time: time.to_string(),
            timestamp: Utc::now(),
            coverage: SnapshotCoverage {
                available: records.len(),
                total: batch.total,
            },
            provinces: records,
        };
        self.snapshot_cache.insert(cache_key, payload.clone());
        Ok(payload)
    }

    /// Build the full-day hourly series for every province via a bounded
    /// fan-out with the complete fallback chain per province.
    async fn build_snapshot_hourly(&self, date: &str, target_date: NaiveDate) -> ProvinceHourlyBatch {
        let provinces = self.geo.all().to_vec();
        let total = provinces.len();
        let opts = FallbackOptions::snapshot_batch(date);

        let outcomes = fan_out(provinces, MAX_CONCURRENT_REQUESTS, |province| {
            let opts = opts.clone();
            async move {
                self.fetch_snapshot_hourly_for(province, target_date, opts)
                    .await
            }
        })
        .await;

        ProvinceHourlyBatch {
            provinces: outcomes.into_iter().flatten().collect(),
            total,
        }
    }

    async fn fetch_snapshot_hourly_for(
        &self,
        province: Province,
        target_date: NaiveDate,
        opts: FallbackOptions,
    ) -> Option<ProvinceHourly> {
        let Some(coordinates) = province.coordinates() else {
            tracing::warn!(
                "Skipping province without coordinates: {} ({})",
                province.name,
                province.plate_code
            );
            return None;
        };

        match self
            .fetch_range_with_fallback(coordinates, target_date, target_date, true, &opts)
            .await
        {
            Ok(data) => Some(ProvinceHourly {
                plate_code: normalize_plate_code(&province.plate_code),
                name: province.name,
                hourly: data.hourly.unwrap_or_default(),
            }),
            Err(err) => {
                tracing::warn!(
                    "Snapshot fetch failed for {} ({}): {}",
                    province.name,
                    province.plate_code,
                    err
                );
                None
            }
        }
    }

    async fn fetch_current_for(
        &self,
        province: Province,
        today: NaiveDate,
    ) -> Option<CurrentConditions> {
        let Some(coordinates) = province.coordinates() else {
            tracing::warn!(
                "Skipping province without coordinates: {} ({})",
                province.name,
                province.plate_code
            );
            return None;
        };

        match self
            .client
            .current(coordinates.latitude, coordinates.longitude, CallOptions::default())
            .await
        {
            Ok(response) => {
                let sample = response.current.unwrap_or_default();
                Some(current_from_sample(&province, &sample))
            }
            Err(err) => {
                tracing::warn!(
                    "Current weather failed for {} ({}): {}",
                    province.name,
                    province.plate_code,
                    err
                );

                match self
                    .client
                    .recent(
                        coordinates.latitude,
                        coordinates.longitude,
                        today,
                        today,
                        true,
                        CallOptions::default(),
                    )
                    .await
                {
                    Ok(range) => {
                        let hourly = range.hourly.unwrap_or_default();
                        let index = hourly.temperature_2m.len().saturating_sub(1);
                        Some(current_from_series(&province, &hourly, index))
                    }
                    Err(fallback_err) => {
                        tracing::error!(
                            "Fallback weather failed for {} ({}): {}",
                            province.name,
                            province.plate_code,
                            fallback_err
                        );
                        None
                    }
                }
            }
        }
    }

    /// Three-tier fallback for one coordinate and date range: archive,
    /// then forecast, then a synthetic series from the instantaneous
    /// reading. A tier only counts as a success when its series has at
    /// least one timestamp.
    async fn fetch_range_with_fallback(
        &self,
        coordinates: Coordinates,
        start_date: NaiveDate,
        end_date: NaiveDate,
        hourly: bool,
        opts: &FallbackOptions,
    ) -> AppResult<WeatherData> {
        let Coordinates {
            latitude,
            longitude,
        } = coordinates;

        match self
            .client
            .historical(latitude, longitude, start_date, end_date, hourly, opts.range_call)
            .await
        {
            Ok(range) if range_has_data(&range, hourly) => return Ok(range_into_data(range, hourly)),
            Ok(_) => tracing::warn!("Archive API returned no data. Trying forecast API."),
            Err(err) => tracing::warn!("Archive API failed: {}. Trying forecast API.", err),
        }

        match self
            .client
            .recent(latitude, longitude, start_date, end_date, hourly, opts.range_call)
            .await
        {
            Ok(range) if range_has_data(&range, hourly) => return Ok(range_into_data(range, hourly)),
            Ok(_) => {
                tracing::error!("Forecast API returned no data. Falling back to current weather.")
            }
            Err(err) => {
                tracing::error!("Forecast API failed: {}. Falling back to current weather.", err)
            }
        }

        // The instantaneous endpoint can only answer for the current day.
        let today = Local::now().date_naive();
        if start_date != today {
            return Err(AppError::UpstreamUnavailable(format!(
                "no range data for {}",
                start_date
            )));
        }

        let current = self
            .client
            .current(latitude, longitude, opts.current_call)
            .await
            .map_err(|err| {
                tracing::error!("Current weather fallback failed: {}", err);
                AppError::UpstreamUnavailable(format!("all fallback tiers failed: {}", err))
            })?;

        let sample = current.current.unwrap_or_default();
        if hourly {
            Ok(WeatherData {
                hourly: Some(synthesize_hourly(&sample, opts)),
                daily: None,
            })
        } else {
            Ok(WeatherData {
                hourly: None,
                daily: Some(synthesize_daily(&sample, start_date)),
            })
        }
    }
}

/// Run one fetch per province with at most `limit` in flight at any
/// instant. Every outcome is independent: a `None` contributes nothing and
/// does not cancel or delay sibling fetches. Completes only when all
/// fetches have finished.
pub(crate) async fn fan_out<T, F, Fut>(
    provinces: Vec<Province>,
    limit: usize,
    fetch: F,
) -> Vec<Option<T>>
where
    F: Fn(Province) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let semaphore = Arc::new(Semaphore::new(limit));

    let tasks: Vec<_> = provinces
        .into_iter()
        .map(|province| {
            let semaphore = Arc::clone(&semaphore);
            let fetch_one = fetch(province);
            async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return None,
                };
                fetch_one.await
            }
        })
        .collect();

    join_all(tasks).await
}

/// Index of the sampled hour closest to the target fractional hour.
///
/// Unparseable timestamps are skipped; when none parse, the index falls
/// back to 0. Ties keep the first index because the comparison is strictly
/// less-than against the running best.
pub(crate) fn resolve_best_hour_index(time_values: &[String], target_hour: f64) -> usize {
    let mut best_index = 0;
    let mut best_distance = 999.0;

    for (index, time_value) in time_values.iter().enumerate() {
        let Some(hour_fraction) = extract_hour_fraction(time_value) else {
            continue;
        };

        let distance = (hour_fraction - target_hour).abs();
        if distance < best_distance {
            best_distance = distance;
            best_index = index;
        }
    }

    best_index
}

fn series_value<T: Copy>(values: &[Option<T>], index: usize) -> Option<T> {
    values.get(index).copied().flatten()
}

fn column_value<T: Copy>(column: Option<&Vec<Option<T>>>, index: usize) -> Option<T> {
    column.and_then(|values| series_value(values, index))
}

fn range_has_data(range: &RangeResponse, hourly: bool) -> bool {
    if hourly {
        range.hourly.as_ref().is_some_and(|series| !series.is_empty())
    } else {
        range.daily.as_ref().is_some_and(|series| !series.is_empty())
    }
}

fn range_into_data(range: RangeResponse, hourly: bool) -> WeatherData {
    if hourly {
        WeatherData {
            hourly: range.hourly,
            daily: None,
        }
    } else {
        WeatherData {
            hourly: None,
            daily: range.daily,
        }
    }
}

/// Build a one-point hourly series from an instantaneous reading. A
/// missing apparent temperature defaults to the temperature itself.
fn synthesize_hourly(sample: &CurrentSample, opts: &FallbackOptions) -> HourlySeries {
    let temperature = sample.temperature_2m.unwrap_or(0.0);

    HourlySeries {
        time: vec![sample
            .time
            .clone()
            .unwrap_or_else(|| opts.default_time.clone())],
        temperature_2m: vec![Some(temperature)],
        precipitation: vec![Some(sample.precipitation.unwrap_or(0.0))],
        wind_speed_10m: vec![Some(sample.wind_speed_10m.unwrap_or(0.0))],
        relative_humidity_2m: vec![Some(
            sample.relative_humidity_2m.unwrap_or(opts.default_humidity),
        )],
        weather_code: Some(vec![Some(sample.weather_code.unwrap_or(0))]),
        apparent_temperature: Some(vec![Some(
            sample.apparent_temperature.unwrap_or(temperature),
        )]),
        wind_direction_10m: Some(vec![Some(sample.wind_direction_10m.unwrap_or(0.0))]),
        pressure_msl: Some(vec![Some(sample.pressure_msl.unwrap_or(0.0))]),
        visibility: Some(vec![Some(sample.visibility.unwrap_or(0.0))]),
        cloud_cover: Some(vec![Some(sample.cloud_cover.unwrap_or(0))]),
    }
}

fn synthesize_daily(sample: &CurrentSample, date: NaiveDate) -> shared::models::DailySeries {
    let temperature = sample.temperature_2m.unwrap_or(0.0);

    shared::models::DailySeries {
        time: vec![date.to_string()],
        temperature_2m_max: vec![Some(temperature)],
        temperature_2m_min: vec![Some(temperature)],
        precipitation_sum: vec![Some(sample.precipitation.unwrap_or(0.0))],
        weather_code: Some(vec![Some(sample.weather_code.unwrap_or(0))]),
    }
}

fn current_from_sample(province: &Province, sample: &CurrentSample) -> CurrentConditions {
    let weather_code = sample.weather_code.unwrap_or(0);

    CurrentConditions {
        plate_code: province.plate_code.clone(),
        name: province.name.clone(),
        temperature: sample.temperature_2m.unwrap_or(0.0),
        precipitation: sample.precipitation.unwrap_or(0.0),
        humidity: sample.relative_humidity_2m.unwrap_or(0),
        wind_speed: sample.wind_speed_10m.unwrap_or(0.0),
        icon: format!("code_{}", weather_code),
        apparent_temperature: Some(
            sample
                .apparent_temperature
                .or(sample.temperature_2m)
                .unwrap_or(0.0),
        ),
        pressure_msl: Some(sample.pressure_msl.unwrap_or(0.0)),
        visibility: Some(sample.visibility.unwrap_or(0.0)),
        cloud_cover: Some(sample.cloud_cover.unwrap_or(0)),
        wind_direction_10m: Some(sample.wind_direction_10m.unwrap_or(0.0)),
        weather_code: Some(weather_code),
    }
}

fn current_from_series(
    province: &Province,
    hourly: &HourlySeries,
    index: usize,
) -> CurrentConditions {
    let temperature = series_value(&hourly.temperature_2m, index).unwrap_or(0.0);
    let weather_code = column_value(hourly.weather_code.as_ref(), index).unwrap_or(0);

    CurrentConditions {
        plate_code: province.plate_code.clone(),
        name: province.name.clone(),
        temperature,
        precipitation: series_value(&hourly.precipitation, index).unwrap_or(0.0),
        humidity: series_value(&hourly.relative_humidity_2m, index).unwrap_or(0),
        wind_speed: series_value(&hourly.wind_speed_10m, index).unwrap_or(0.0),
        icon: format!("code_{}", weather_code),
        apparent_temperature: Some(
            column_value(hourly.apparent_temperature.as_ref(), index).unwrap_or(temperature),
        ),
        pressure_msl: Some(column_value(hourly.pressure_msl.as_ref(), index).unwrap_or(0.0)),
        visibility: Some(column_value(hourly.visibility.as_ref(), index).unwrap_or(0.0)),
        cloud_cover: Some(column_value(hourly.cloud_cover.as_ref(), index).unwrap_or(0)),
        wind_direction_10m: Some(
            column_value(hourly.wind_direction_10m.as_ref(), index).unwrap_or(0.0),
        ),
        weather_code: Some(weather_code),
    }
}
