//! Gemini generative-text client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use skyscribe_core::{NarrativeConfig, ReqwestErrorExt};
use skyscribe_weather::WeatherReading;
use tracing::instrument;

use crate::error::GeneratorError;
use crate::prompt::Prompt;
use crate::types::*;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Turns a weather reading into prose.
///
/// One call is one outbound request: no retries.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn narrate(&self, reading: &WeatherReading) -> Result<NarrativeText, GeneratorError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(config: &NarrativeConfig, api_key: &str) -> Result<Self, GeneratorError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(GeneratorError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeneratorError::Network(e.into_network_error()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.trim().to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Send a prepared prompt and return the generated text.
    #[instrument(skip(self, prompt), fields(model = %self.model), level = "info")]
    pub async fn generate(&self, prompt: &Prompt) -> Result<NarrativeText, GeneratorError> {
        let body = GenerateContentRequest {
            system_instruction: ApiContent::text(None, prompt.system.as_str()),
            contents: vec![ApiContent::text(Some("user"), prompt.user.as_str())],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Network(e.into_network_error()))?;

        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<NarrativeText, GeneratorError> {
        let status = response.status();

        if status.is_success() {
            let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Network(e.into_network_error())
                } else {
                    GeneratorError::Parse(e.to_string())
                }
            })?;
            return parsed.into_narrative();
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
            .ok()
            .and_then(|env| env.error)
            .map(|detail| match (detail.status, detail.message) {
                (Some(code), Some(msg)) => format!("{code}: {msg}"),
                (None, Some(msg)) => msg,
                (Some(code), None) => code,
                (None, None) => status.to_string(),
            })
            .unwrap_or_else(|| status.to_string());

        tracing::warn!(status = status.as_u16(), "Narrative request failed: {}", message);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GeneratorError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => GeneratorError::RateLimited,
            s if s.is_server_error() => GeneratorError::ServiceUnavailable(message),
            // Gemini reports a bad key as 400 INVALID_ARGUMENT
            StatusCode::BAD_REQUEST if message.contains("API key") => GeneratorError::Unauthorized,
            s => GeneratorError::Status {
                status: s.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl NarrativeGenerator for GeminiClient {
    async fn narrate(&self, reading: &WeatherReading) -> Result<NarrativeText, GeneratorError> {
        let prompt = Prompt::for_reading(reading);
        let narrative = self.generate(&prompt).await?;
        tracing::debug!(chars = narrative.as_str().len(), "Narrative generated");
        Ok(narrative)
    }
}
