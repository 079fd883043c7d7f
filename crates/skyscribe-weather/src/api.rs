//! OpenWeatherMap wire format.
//!
//! Every field is optional at the serde level so a missing value surfaces as
//! `WeatherError::MissingField` instead of a generic parse failure.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use skyscribe_core::UnitSystem;

use crate::error::WeatherError;
use crate::types::{units_for, ReadingFields, Temperature, WeatherReading, WindSpeed, WindSpeedUnit};

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentWeatherResponse {
    cod: Option<Value>,
    message: Option<Value>,
    name: Option<String>,
    main: Option<MainBlock>,
    wind: Option<WindBlock>,
    weather: Option<Vec<ConditionBlock>>,
    sys: Option<SysBlock>,
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    id: Option<u16>,
    main: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SysBlock {
    country: Option<String>,
}

/// Body of a non-2xx response, e.g. `{"cod":"404","message":"city not found"}`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

/// The provider signals errors through `cod` as a number or a string
fn cod_is_ok(cod: &Value) -> bool {
    match cod {
        Value::Number(n) => n.as_i64() == Some(200),
        Value::String(s) => s.trim() == "200",
        _ => false,
    }
}

impl CurrentWeatherResponse {
    /// Validate the response and build a reading in the given unit system
    pub fn into_reading(
        self,
        units: UnitSystem,
        requested: &str,
    ) -> Result<WeatherReading, WeatherError> {
        if let Some(cod) = &self.cod {
            if !cod_is_ok(cod) {
                tracing::debug!(cod = %cod, message = ?self.message, "Provider reported failure in body");
                return Err(WeatherError::LocationNotFound(requested.to_string()));
            }
        }

        let name = self.name.ok_or(WeatherError::MissingField("name"))?;
        let main = self.main.ok_or(WeatherError::MissingField("main"))?;
        let temp = main.temp.ok_or(WeatherError::MissingField("main.temp"))?;
        let feels_like = main
            .feels_like
            .ok_or(WeatherError::MissingField("main.feels_like"))?;
        let humidity = main
            .humidity
            .ok_or(WeatherError::MissingField("main.humidity"))?;
        let speed = self
            .wind
            .ok_or(WeatherError::MissingField("wind"))?
            .speed
            .ok_or(WeatherError::MissingField("wind.speed"))?;
        let condition = self
            .weather
            .and_then(|w| w.into_iter().next())
            .ok_or(WeatherError::MissingField("weather[0]"))?;
        let condition_code = condition
            .id
            .ok_or(WeatherError::MissingField("weather[0].id"))?;
        let condition_main = condition
            .main
            .ok_or(WeatherError::MissingField("weather[0].main"))?;
        let description = condition
            .description
            .ok_or(WeatherError::MissingField("weather[0].description"))?;

        if !humidity.is_finite() || !(0.0..=100.0).contains(&humidity) {
            return Err(WeatherError::InvalidData(format!(
                "humidity {humidity} is outside 0..=100"
            )));
        }

        let (temperature_unit, wind_unit) = units_for(units);
        let wind_speed = match wind_unit {
            WindSpeedUnit::KilometersPerHour => WindSpeed::from_mps_to_kmh(speed),
            unit => WindSpeed::new(speed, unit),
        };

        let observed_at = self
            .dt
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        WeatherReading::new(ReadingFields {
            location: name,
            country: self.sys.and_then(|s| s.country),
            temperature: Temperature::new(temp, temperature_unit),
            feels_like: Temperature::new(feels_like, temperature_unit),
            humidity: humidity.round() as u8,
            wind_speed,
            condition: condition_main,
            description,
            condition_code,
            observed_at,
        })
    }
}
