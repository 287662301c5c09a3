//! Business logic services for the Turkey Climate Map API

pub mod cache;
pub mod geo;
pub mod weather;

pub use cache::TtlCache;
pub use geo::ProvinceDirectory;
pub use weather::WeatherService;
