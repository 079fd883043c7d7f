//! Centralized error types for Skyscribe.
//!
//! Provider crates keep their own detailed errors and convert them into the
//! categories defined here:
//! - `ConfigError` for startup problems (fatal)
//! - `FetchError` when the weather lookup fails (query aborted)
//! - `NarrativeError` when the narrative step fails (warning only)
//!
//! Every category exposes `user_message()` for display.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Narrative error: {0}")]
    Narrative(#[from] NarrativeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Fetch(e) => e.user_message(),
            AppError::Narrative(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// Classify an error from an `anyhow` call chain (config loading, startup).
    ///
    /// Config and IO failures keep their category even when wrapped in context.
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ConfigError>() {
            Ok(config) => return AppError::Config(config),
            Err(err) => err,
        };
        match err.downcast::<std::io::Error>() {
            Ok(io) => AppError::Io(io),
            Err(err) => AppError::Other(err),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("TLS/SSL error: {0}")]
    TlsError(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Connection Error: Check your internet or API access."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
            NetworkError::TlsError(_) => "Secure connection failed. Check your network settings.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration directory not found. Check your environment.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => {
                "A required setting is missing. Set OPENWEATHER_API_KEY and try again."
            }
        }
    }
}

/// Weather lookup failures, as presented to the user.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No location given")]
    EmptyLocation,

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Invalid weather API key")]
    InvalidApiKey,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Weather provider rate limit exceeded")]
    RateLimited,

    #[error("Weather service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Invalid weather response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::EmptyLocation => "Please enter a city name.",
            FetchError::LocationNotFound(_) => "Not Found: City not found.",
            FetchError::InvalidApiKey => "Unauthorized: Invalid OpenWeatherMap Key.",
            FetchError::BadRequest(_) => "Bad Request: Check city spelling.",
            FetchError::RateLimited => "Too many requests. Please wait and try again.",
            FetchError::ServiceUnavailable(_) => {
                "Weather service unavailable. Please try again later."
            }
            FetchError::Network(e) => e.user_message(),
            FetchError::InvalidResponse(_) => "Could not retrieve weather. Please try again.",
        }
    }
}

/// Narrative generation failures. These never hide the weather reading.
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("Narrative generation not configured")]
    NotConfigured,

    #[error("Invalid narrative API key")]
    InvalidApiKey,

    #[error("Narrative refused by provider: {0}")]
    Refused(String),

    #[error("Narrative provider rate limit exceeded")]
    RateLimited,

    #[error("Narrative service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Invalid narrative response: {0}")]
    InvalidResponse(String),
}

impl NarrativeError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NarrativeError::NotConfigured => "AI reporter is offline. Set GEMINI_API_KEY to enable it.",
            NarrativeError::InvalidApiKey => "AI reporter key was rejected. Check GEMINI_API_KEY.",
            NarrativeError::Refused(_) => "AI reporter declined to describe this weather.",
            NarrativeError::RateLimited => "AI reporter is busy. Please try again shortly.",
            NarrativeError::Unavailable(_) => "AI reporter is offline.",
            NarrativeError::Network(_) => "AI reporter failed to connect.",
            NarrativeError::InvalidResponse(_) => "AI response unavailable.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
