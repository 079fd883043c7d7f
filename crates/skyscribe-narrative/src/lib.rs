//! Narrative generator for Skyscribe.
//!
//! Builds a prompt from a `WeatherReading` and asks the Gemini API for a
//! short human-readable description.

pub mod client;
pub mod error;
pub mod prompt;
pub mod types;

pub use client::{GeminiClient, NarrativeGenerator};
pub use error::GeneratorError;
pub use prompt::Prompt;
pub use types::NarrativeText;
