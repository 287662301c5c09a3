//! HTTP handlers for the Turkey Climate Map API

pub mod health;
pub mod provinces;
pub mod weather;

pub use health::*;
pub use provinces::*;
pub use weather::*;
