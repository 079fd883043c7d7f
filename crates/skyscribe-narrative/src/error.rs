//! Narrative generator errors.

use skyscribe_core::{NarrativeError, NetworkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Narrative API key not configured")]
    MissingApiKey,

    #[error("Unauthorized - narrative API key rejected")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Rate limited by narrative provider")]
    RateLimited,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Provider refused to generate text: {0}")]
    Refused(String),

    #[error("Provider returned no text")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),
}

impl GeneratorError {
    /// Whether the failure came from the request timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(NetworkError::Timeout))
    }

    /// Display text for this failure; matches the `NarrativeError` it converts to.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingApiKey => NarrativeError::NotConfigured.user_message(),
            Self::Unauthorized => NarrativeError::InvalidApiKey.user_message(),
            Self::Network(_) => "AI reporter failed to connect.",
            Self::RateLimited => NarrativeError::RateLimited.user_message(),
            Self::ServiceUnavailable(_) | Self::Status { .. } => {
                NarrativeError::Unavailable(String::new()).user_message()
            }
            Self::Refused(_) => NarrativeError::Refused(String::new()).user_message(),
            Self::EmptyResponse | Self::Parse(_) => {
                NarrativeError::InvalidResponse(String::new()).user_message()
            }
        }
    }
}

impl From<GeneratorError> for NarrativeError {
    fn from(e: GeneratorError) -> Self {
        match e {
            GeneratorError::MissingApiKey => NarrativeError::NotConfigured,
            GeneratorError::Unauthorized => NarrativeError::InvalidApiKey,
            GeneratorError::Network(n) => NarrativeError::Network(n),
            GeneratorError::RateLimited => NarrativeError::RateLimited,
            GeneratorError::ServiceUnavailable(msg) => NarrativeError::Unavailable(msg),
            GeneratorError::Status { status, message } => {
                NarrativeError::Unavailable(format!("HTTP {status}: {message}"))
            }
            GeneratorError::Refused(reason) => NarrativeError::Refused(reason),
            GeneratorError::EmptyResponse => {
                NarrativeError::InvalidResponse("empty response".to_string())
            }
            GeneratorError::Parse(msg) => NarrativeError::InvalidResponse(msg),
        }
    }
}

impl From<GeneratorError> for skyscribe_core::AppError {
    fn from(e: GeneratorError) -> Self {
        skyscribe_core::AppError::Narrative(e.into())
    }
}
