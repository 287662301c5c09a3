//! Turkey Climate Map - Backend Server
//!
//! Serves weather data for the 81 provinces of Turkey by aggregating
//! Open-Meteo upstream calls behind bounded fan-outs and TTL caches.

use axum::{routing::get, Router};
use std::{net::SocketAddr, path::Path, sync::Arc, time::Instant};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod models;
mod routes;
mod services;

pub use config::Config;

use external::OpenMeteoClient;
use services::{ProvinceDirectory, WeatherService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub geo: Arc<ProvinceDirectory>,
    pub weather: Arc<WeatherService>,
    pub started_at: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tcm_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Turkey Climate Map Server");
    tracing::info!("Environment: {}", config.environment);

    // Load the static province directory and build the weather engine
    let geo = Arc::new(ProvinceDirectory::load(Path::new(
        &config.data.provinces_path,
    ))?);
    let client = OpenMeteoClient::new(&config.open_meteo)?;
    let weather = Arc::new(WeatherService::new(client, Arc::clone(&geo)));

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        geo,
        weather,
        started_at: Instant::now(),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Turkey Climate Map API v1.0"
}
