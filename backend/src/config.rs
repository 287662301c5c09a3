//! Configuration management for the Turkey Climate Map API
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with TCM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Open-Meteo upstream configuration
    pub open_meteo: OpenMeteoConfig,

    /// Static data configuration
    pub data: DataConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenMeteoConfig {
    /// Forecast API endpoint (also serves instantaneous conditions)
    pub base_url: String,

    /// Archive API endpoint for historical data
    pub archive_url: String,

    /// Default per-request timeout in seconds
    pub timeout_seconds: f64,

    /// Default retry budget for transient upstream failures
    pub max_retries: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Path to the province directory JSON file
    pub provinces_path: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("TCM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("open_meteo.base_url", "https://api.open-meteo.com/v1/forecast")?
            .set_default(
                "open_meteo.archive_url",
                "https://archive-api.open-meteo.com/v1/archive",
            )?
            .set_default("open_meteo.timeout_seconds", 12.0)?
            .set_default("open_meteo.max_retries", 2)?
            .set_default("data.provinces_path", "data/province_coordinates.json")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (TCM_ prefix)
            .add_source(
                Environment::with_prefix("TCM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}
