//! API models for the Turkey Climate Map backend
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
