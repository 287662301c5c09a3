//! Route definitions for the Turkey Climate Map API

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/provinces", province_routes())
        .nest("/weather", weather_routes())
}

/// Province directory routes
fn province_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_provinces))
        .route("/:plate_code", get(handlers::get_province))
}

/// Weather data routes
fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_weather))
        .route("/current", get(handlers::get_current_weather))
        .route("/snapshot", get(handlers::get_weather_snapshot))
}
