//! Shared types and models for the Turkey Climate Map API
//!
//! This crate contains the serde models for the weather endpoints, the
//! province directory records, and the validation helpers used by the
//! backend and its tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
