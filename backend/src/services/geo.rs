//! Province directory service
//!
//! Loads the static province directory once at startup and serves lookups
//! from memory. The directory is never mutated after loading.

use std::path::Path;

use serde::Deserialize;

use shared::models::Province;

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
struct ProvinceFile {
    #[serde(default)]
    provinces: Vec<Province>,
}

/// In-memory directory of the 81 provinces
#[derive(Debug)]
pub struct ProvinceDirectory {
    provinces: Vec<Province>,
}

impl ProvinceDirectory {
    /// Load the directory from a JSON file
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "Cannot read province directory {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: ProvinceFile = serde_json::from_str(&raw).map_err(|e| {
            AppError::Configuration(format!(
                "Cannot parse province directory {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            "Loaded {} provinces from {}",
            file.provinces.len(),
            path.display()
        );

        Ok(Self {
            provinces: file.provinces,
        })
    }

    /// Build a directory from an in-memory list (for testing)
    pub fn from_provinces(provinces: Vec<Province>) -> Self {
        Self { provinces }
    }

    pub fn all(&self) -> &[Province] {
        &self.provinces
    }

    pub fn by_code(&self, plate_code: &str) -> Option<&Province> {
        self.provinces
            .iter()
            .find(|province| province.plate_code == plate_code)
    }

    pub fn len(&self) -> usize {
        self.provinces.len()
    }
}
