//! Weather provider errors.

use skyscribe_core::{FetchError, NetworkError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location must not be empty")]
    EmptyLocation,

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized - weather API key rejected")]
    Unauthorized,

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Rate limited by weather provider")]
    RateLimited,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing field in weather response: {0}")]
    MissingField(&'static str),

    #[error("Invalid weather data: {0}")]
    InvalidData(String),
}

impl From<WeatherError> for FetchError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::EmptyLocation => FetchError::EmptyLocation,
            WeatherError::Network(n) => FetchError::Network(n),
            WeatherError::BadRequest(msg) => FetchError::BadRequest(msg),
            WeatherError::Unauthorized => FetchError::InvalidApiKey,
            WeatherError::LocationNotFound(loc) => FetchError::LocationNotFound(loc),
            WeatherError::RateLimited => FetchError::RateLimited,
            WeatherError::ServiceUnavailable(msg) => FetchError::ServiceUnavailable(msg),
            WeatherError::Status { status, message } => {
                FetchError::Network(NetworkError::ServerError { status, message })
            }
            WeatherError::Parse(msg) | WeatherError::InvalidData(msg) => {
                FetchError::InvalidResponse(msg)
            }
            WeatherError::MissingField(field) => {
                FetchError::InvalidResponse(format!("missing field {field}"))
            }
        }
    }
}

impl From<WeatherError> for skyscribe_core::AppError {
    fn from(e: WeatherError) -> Self {
        skyscribe_core::AppError::Fetch(e.into())
    }
}
