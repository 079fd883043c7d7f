//! Weather fetcher seam and the OpenWeatherMap implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use skyscribe_core::{ReqwestErrorExt, UnitSystem, WeatherConfig};
use tracing::instrument;

use crate::api::{CurrentWeatherResponse, ErrorBody};
use crate::error::WeatherError;
use crate::types::WeatherReading;

const USER_AGENT: &str = concat!("Skyscribe/", env!("CARGO_PKG_VERSION"));

/// Looks up current conditions for a location.
///
/// One call is one outbound request: no retries and no caching.
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<WeatherReading, WeatherError>;
}

/// OpenWeatherMap "current weather" client
#[derive(Clone)]
pub struct OpenWeatherMapProvider {
    client: Client,
    base_url: String,
    api_key: String,
    units: UnitSystem,
}

impl std::fmt::Debug for OpenWeatherMapProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapProvider")
            .field("base_url", &self.base_url)
            .field("units", &self.units)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherMapProvider {
    pub fn new(config: &WeatherConfig, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            units: config.units,
        })
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Map a non-2xx response to the matching error
    fn status_error(status: StatusCode, body: &str, location: &str) -> WeatherError {
        let message = ErrorBody::parse(body)
            .message
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

        match status {
            StatusCode::BAD_REQUEST => WeatherError::BadRequest(message),
            StatusCode::UNAUTHORIZED => WeatherError::Unauthorized,
            StatusCode::NOT_FOUND => WeatherError::LocationNotFound(location.to_string()),
            StatusCode::TOO_MANY_REQUESTS => WeatherError::RateLimited,
            s if s.is_server_error() => WeatherError::ServiceUnavailable(format!("HTTP {s}")),
            s => WeatherError::Status {
                status: s.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherMapProvider {
    #[instrument(skip(self), level = "info")]
    async fn fetch(&self, location: &str) -> Result<WeatherReading, WeatherError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(WeatherError::EmptyLocation);
        }

        let url = format!("{}/weather", self.base_url);
        tracing::debug!(units = self.units.as_query(), "Requesting current weather");

        // without_url keeps the appid query parameter out of error messages
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_query()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.without_url().into_network_error()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Network(e.without_url().into_network_error()))?;

        if !status.is_success() {
            let err = Self::status_error(status, &body, location);
            tracing::warn!("Weather request failed: {}", err);
            return Err(err);
        }

        let raw: CurrentWeatherResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        let reading = raw.into_reading(self.units, location)?;
        tracing::info!(
            location = reading.location(),
            condition = reading.condition(),
            "Weather reading received"
        );
        Ok(reading)
    }
}
