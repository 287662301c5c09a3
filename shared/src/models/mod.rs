//! Domain models for the Turkey Climate Map API

pub mod province;
pub mod weather;

pub use province::*;
pub use weather::*;
