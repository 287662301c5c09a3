//! Province directory models

use serde::{Deserialize, Serialize};

use crate::types::Coordinates;

/// One entry of the static province directory.
///
/// Coordinates are optional because the directory file is hand-maintained;
/// provinces without coordinates are skipped by batch weather fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Province {
    pub name: String,
    pub plate_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_km2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl Province {
    /// Coordinates of the province, if the directory has them.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// Province listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvinceList {
    pub provinces: Vec<Province>,
    pub total: usize,
}
