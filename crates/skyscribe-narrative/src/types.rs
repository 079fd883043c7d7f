//! Narrative types and Gemini API wire structures.

use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

/// Generated prose describing one weather reading.
///
/// Always trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeText(String);

impl NarrativeText {
    pub fn new(text: impl AsRef<str>) -> Result<Self, GeneratorError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NarrativeText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---- generateContent request ----

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: ApiContent,
    pub contents: Vec<ApiContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<ApiPart>,
}

impl ApiContent {
    pub fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![ApiPart {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// ---- generateContent response ----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<ApiCandidate>,
    pub prompt_feedback: Option<ApiPromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCandidate {
    pub content: Option<ApiContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPromptFeedback {
    pub block_reason: Option<String>,
}

/// Error envelope: `{"error": {"code": 400, "message": "...", "status": "INVALID_ARGUMENT"}}`
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorDetail {
    pub message: Option<String>,
    pub status: Option<String>,
}

/// Finish reasons that mean the provider withheld the text
const REFUSAL_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

impl GenerateContentResponse {
    /// Extract the generated text, or the reason there is none.
    pub fn into_narrative(self) -> Result<NarrativeText, GeneratorError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GeneratorError::Refused(reason));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(GeneratorError::EmptyResponse)?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            if let Some(reason) = candidate.finish_reason {
                if REFUSAL_FINISH_REASONS.contains(&reason.as_str()) {
                    return Err(GeneratorError::Refused(reason));
                }
            }
        }

        NarrativeText::new(text)
    }
}
