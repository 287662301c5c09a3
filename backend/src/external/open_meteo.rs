//! Open-Meteo API client
//!
//! Talks to the forecast and archive endpoints and deserializes their
//! payloads straight into the shared series models, so nothing
//! loosely-shaped travels past this module. Transient transport failures
//! are retried with linear backoff before the call is reported as failed.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use shared::models::{DailySeries, HourlySeries};

use crate::config::OpenMeteoConfig;
use crate::error::{AppError, AppResult};

/// Hourly variables requested from the upstream provider
pub const HOURLY_VARIABLES: &str = "temperature_2m,apparent_temperature,precipitation,\
wind_speed_10m,wind_direction_10m,relative_humidity_2m,pressure_msl,visibility,\
cloud_cover,weather_code";

/// Daily variables requested from the upstream provider
pub const DAILY_VARIABLES: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_sum,weather_code";

/// All timestamps are requested in the local timezone of the provinces
pub const TIMEZONE: &str = "Europe/Istanbul";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Per-call overrides for timeout and retry budget.
///
/// Batch call sites use tighter values than the client defaults so a slow
/// upstream cannot stretch a whole fan-out.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
}

impl CallOptions {
    pub fn bounded(timeout: Duration, retries: u32) -> Self {
        Self {
            timeout: Some(timeout),
            retries: Some(retries),
        }
    }
}

/// Range (archive or forecast) API response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeResponse {
    #[serde(default)]
    pub hourly: Option<HourlySeries>,
    #[serde(default)]
    pub daily: Option<DailySeries>,
}

/// Instantaneous conditions API response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentResponse {
    #[serde(default)]
    pub current: Option<CurrentSample>,
}

/// One instantaneous reading
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentSample {
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub wind_direction_10m: Option<f64>,
    pub relative_humidity_2m: Option<i32>,
    pub pressure_msl: Option<f64>,
    pub visibility: Option<f64>,
    pub cloud_cover: Option<i32>,
    pub weather_code: Option<i32>,
}

/// Open-Meteo API client
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    archive_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl OpenMeteoClient {
    /// Create a client from configuration
    pub fn new(config: &OpenMeteoConfig) -> AppResult<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(40)
            .build()
            .map_err(|e| AppError::Configuration(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            archive_url: config.archive_url.clone(),
            timeout: Duration::from_secs_f64(config.timeout_seconds),
            max_retries: config.max_retries,
        })
    }

    /// Create a client with custom endpoints (for testing)
    pub fn with_base_urls(base_url: String, archive_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            archive_url,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Fetch instantaneous conditions for a coordinate
    pub async fn current(
        &self,
        latitude: f64,
        longitude: f64,
        opts: CallOptions,
    ) -> AppResult<CurrentResponse> {
        let params = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", HOURLY_VARIABLES.to_string()),
            ("timezone", TIMEZONE.to_string()),
        ];

        self.request_json(&self.base_url, &params, opts).await
    }

    /// Fetch historical weather from the archive endpoint
    pub async fn historical(
        &self,
        latitude: f64,
        longitude: f64,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
        hourly: bool,
        opts: CallOptions,
    ) -> AppResult<RangeResponse> {
        let params = Self::range_params(latitude, longitude, start_date, end_date, hourly);
        self.request_json(&self.archive_url, &params, opts).await
    }

    /// Fetch a recent date range from the forecast endpoint
    pub async fn recent(
        &self,
        latitude: f64,
        longitude: f64,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
        hourly: bool,
        opts: CallOptions,
    ) -> AppResult<RangeResponse> {
        let params = Self::range_params(latitude, longitude, start_date, end_date, hourly);
        self.request_json(&self.base_url, &params, opts).await
    }

    fn range_params(
        latitude: f64,
        longitude: f64,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
        hourly: bool,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("start_date", start_date.to_string()),
            ("end_date", end_date.to_string()),
            ("timezone", TIMEZONE.to_string()),
        ];

        if hourly {
            params.push(("hourly", HOURLY_VARIABLES.to_string()));
        } else {
            params.push(("daily", DAILY_VARIABLES.to_string()));
        }

        params
    }

    /// Perform a GET request with retry and linear backoff on transient
    /// transport failures. A payload that fails to deserialize is an
    /// internal error and is never retried.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        opts: CallOptions,
    ) -> AppResult<T> {
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let request_timeout = opts.timeout.unwrap_or(self.timeout);
        let mut last_error = String::new();

        for attempt in 0..=max_retries {
            let result = self
                .client
                .get(url)
                .query(params)
                .timeout(request_timeout)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match result {
                Ok(response) => {
                    return response.json::<T>().await.map_err(|e| {
                        AppError::Internal(format!("Unexpected Open-Meteo payload shape: {}", e))
                    });
                }
                Err(err) => {
                    last_error = err.to_string();
                    if attempt < max_retries {
                        let wait = Duration::from_millis(500 * u64::from(attempt + 1));
                        tracing::warn!(
                            "Open-Meteo request failed (attempt {}/{}): {}",
                            attempt + 1,
                            max_retries + 1,
                            last_error
                        );
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        tracing::error!("Open-Meteo API error: {}", last_error);
        Err(AppError::ExternalService(format!(
            "Open-Meteo request failed: {}",
            last_error
        )))
    }
}
