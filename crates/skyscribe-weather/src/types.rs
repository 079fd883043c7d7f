use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use skyscribe_core::UnitSystem;

use crate::error::WeatherError;

/// Temperature scale a reading is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Kelvin => " K",
        }
    }
}

/// Wind speed unit a reading is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindSpeedUnit {
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
}

impl WindSpeedUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::MetersPerSecond => "m/s",
            Self::KilometersPerHour => "km/h",
            Self::MilesPerHour => "mph",
        }
    }
}

/// Units a reading carries for a given unit system.
///
/// Metric readings report wind in km/h even though the provider sends m/s.
pub fn units_for(system: UnitSystem) -> (TemperatureUnit, WindSpeedUnit) {
    match system {
        UnitSystem::Metric => (TemperatureUnit::Celsius, WindSpeedUnit::KilometersPerHour),
        UnitSystem::Imperial => (TemperatureUnit::Fahrenheit, WindSpeedUnit::MilesPerHour),
        UnitSystem::Standard => (TemperatureUnit::Kelvin, WindSpeedUnit::MetersPerSecond),
    }
}

/// A temperature tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Temperature {
    pub value: f64,
    pub unit: TemperatureUnit,
}

impl Temperature {
    pub fn new(value: f64, unit: TemperatureUnit) -> Self {
        Self { value, unit }
    }

    pub fn celsius(value: f64) -> Self {
        Self::new(value, TemperatureUnit::Celsius)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}{}", self.value, self.unit.symbol())
    }
}

/// A wind speed tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindSpeed {
    pub value: f64,
    pub unit: WindSpeedUnit,
}

impl WindSpeed {
    pub fn new(value: f64, unit: WindSpeedUnit) -> Self {
        Self { value, unit }
    }

    pub fn kmh(value: f64) -> Self {
        Self::new(value, WindSpeedUnit::KilometersPerHour)
    }

    /// Convert a provider speed in m/s to km/h, rounded to one decimal
    pub fn from_mps_to_kmh(mps: f64) -> Self {
        Self::kmh((mps * 3.6 * 10.0).round() / 10.0)
    }
}

impl fmt::Display for WindSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} {}", self.value, self.unit.symbol())
    }
}

/// Inputs for [`WeatherReading::new`]
#[derive(Debug, Clone)]
pub struct ReadingFields {
    pub location: String,
    pub country: Option<String>,
    pub temperature: Temperature,
    pub feels_like: Temperature,
    pub humidity: u8,
    pub wind_speed: WindSpeed,
    pub condition: String,
    pub description: String,
    pub condition_code: u16,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Current conditions for one location, built once per query.
///
/// Only constructible through [`WeatherReading::new`], which enforces a
/// non-empty location, humidity within 0..=100 and finite, non-negative wind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    location: String,
    country: Option<String>,
    temperature: Temperature,
    feels_like: Temperature,
    humidity: u8,
    wind_speed: WindSpeed,
    condition: String,
    description: String,
    condition_code: u16,
    observed_at: Option<DateTime<Utc>>,
}

impl WeatherReading {
    pub fn new(fields: ReadingFields) -> Result<Self, WeatherError> {
        let location = fields.location.trim().to_string();
        if location.is_empty() {
            return Err(WeatherError::InvalidData("location name is empty".into()));
        }
        if fields.humidity > 100 {
            return Err(WeatherError::InvalidData(format!(
                "humidity {} is outside 0..=100",
                fields.humidity
            )));
        }
        if !fields.temperature.value.is_finite() || !fields.feels_like.value.is_finite() {
            return Err(WeatherError::InvalidData("temperature is not a number".into()));
        }
        if !fields.wind_speed.value.is_finite() || fields.wind_speed.value < 0.0 {
            return Err(WeatherError::InvalidData(format!(
                "wind speed {} is invalid",
                fields.wind_speed.value
            )));
        }
        let condition = fields.condition.trim().to_string();
        if condition.is_empty() {
            return Err(WeatherError::InvalidData("condition is empty".into()));
        }
        let description = fields.description.trim().to_string();
        if description.is_empty() {
            return Err(WeatherError::InvalidData("description is empty".into()));
        }

        Ok(Self {
            location,
            country: fields.country.filter(|c| !c.trim().is_empty()),
            temperature: fields.temperature,
            feels_like: fields.feels_like,
            humidity: fields.humidity,
            wind_speed: fields.wind_speed,
            condition,
            description,
            condition_code: fields.condition_code,
            observed_at: fields.observed_at,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// "Paris, FR" when a country is known, otherwise just the place name
    pub fn display_location(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.location, country),
            None => self.location.clone(),
        }
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    pub fn feels_like(&self) -> Temperature {
        self.feels_like
    }

    pub fn humidity(&self) -> u8 {
        self.humidity
    }

    pub fn wind_speed(&self) -> WindSpeed {
        self.wind_speed
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Detailed condition text
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn condition_code(&self) -> u16 {
        self.condition_code
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.observed_at
    }
}
