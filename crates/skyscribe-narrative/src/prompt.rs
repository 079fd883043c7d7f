//! Prompt construction.
//!
//! The same reading always produces the same prompt text.

use skyscribe_weather::WeatherReading;

pub const SYSTEM_INSTRUCTION: &str = "You are a friendly, conversational weather reporter. \
Your response must be a single, short paragraph (under 30 words) that summarizes the \
current weather and gives a brief insight into how it feels. \
Do not use markdown formatting like bullet points or bold text.";

/// System instruction plus the user prompt for one reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn for_reading(reading: &WeatherReading) -> Self {
        Self {
            system: SYSTEM_INSTRUCTION.to_string(),
            user: user_prompt(reading),
        }
    }
}

fn user_prompt(reading: &WeatherReading) -> String {
    format!(
        "Write a summary for the weather in {location}. \
         The current temperature is {temp}, but it feels like {feels}. \
         Humidity is {humidity}% and wind speed is {wind}. \
         The main condition is '{condition}' with a detailed description of '{description}'.",
        location = reading.display_location(),
        temp = reading.temperature(),
        feels = reading.feels_like(),
        humidity = reading.humidity(),
        wind = reading.wind_speed(),
        condition = reading.condition(),
        description = reading.description(),
    )
}
