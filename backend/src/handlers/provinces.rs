//! HTTP handlers for the province directory endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::models::{Province, ProvinceList};
use crate::AppState;

/// List all provinces
pub async fn list_provinces(State(state): State<AppState>) -> Json<ProvinceList> {
    let provinces = state.geo.all().to_vec();
    let total = provinces.len();

    Json(ProvinceList { provinces, total })
}

/// Get a single province by plate code
pub async fn get_province(
    State(state): State<AppState>,
    Path(plate_code): Path<String>,
) -> AppResult<Json<Province>> {
    state
        .geo
        .by_code(&plate_code)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Province {}", plate_code)))
}
