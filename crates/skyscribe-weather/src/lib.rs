//! Weather fetcher for Skyscribe
//!
//! Looks up current conditions for a named location through the
//! OpenWeatherMap API and turns them into a validated `WeatherReading`.

mod api;
pub mod error;
pub mod provider;
pub mod types;

pub use error::WeatherError;
pub use provider::{OpenWeatherMapProvider, WeatherFetcher};
pub use types::*;
