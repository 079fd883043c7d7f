use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the weather provider key (required)
pub const WEATHER_API_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// Environment variable holding the narrative provider key (optional)
pub const NARRATIVE_API_KEY_VAR: &str = "GEMINI_API_KEY";

const CONFIG_DIR_NAME: &str = "skyscribe";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Unit system requested from the weather provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Celsius, wind in km/h
    #[default]
    Metric,
    /// Fahrenheit, wind in mph
    Imperial,
    /// Kelvin, wind in m/s
    Standard,
}

impl UnitSystem {
    /// Value for the provider's `units` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
            Self::Standard => "standard",
        }
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "celsius" | "c" => Ok(Self::Metric),
            "imperial" | "fahrenheit" | "f" => Ok(Self::Imperial),
            "standard" | "kelvin" | "k" => Ok(Self::Standard),
            other => Err(ConfigError::Invalid(format!("unknown unit system: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the weather provider API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Unit system for readings
    #[serde(default)]
    pub units: UnitSystem,

    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            units: UnitSystem::default(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeConfig {
    /// Base URL of the generative-text API
    #[serde(default = "default_narrative_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_narrative_timeout")]
    pub timeout_secs: u64,

    /// Set to false to skip narrative generation entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_narrative_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_narrative_timeout() -> u64 {
    15
}

fn default_enabled() -> bool {
    true
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            base_url: default_narrative_base_url(),
            model: default_model(),
            timeout_secs: default_narrative_timeout(),
            enabled: default_enabled(),
        }
    }
}

/// API credentials, read once from the environment at startup.
///
/// Never serialized and never logged.
#[derive(Clone, Default)]
pub struct Credentials {
    weather_api_key: Option<String>,
    narrative_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("weather_api_key", &self.weather_api_key.as_ref().map(|_| "***"))
            .field(
                "narrative_api_key",
                &self.narrative_api_key.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

impl Credentials {
    pub fn new(weather_api_key: Option<String>, narrative_api_key: Option<String>) -> Self {
        Self {
            weather_api_key: non_blank(weather_api_key),
            narrative_api_key: non_blank(narrative_api_key),
        }
    }

    /// Read both keys from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both keys through an arbitrary lookup (environment, test map, ...)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::new(lookup(WEATHER_API_KEY_VAR), lookup(NARRATIVE_API_KEY_VAR))
    }

    /// The weather key, or the startup-fatal error when it is absent
    pub fn weather_api_key(&self) -> Result<&str, ConfigError> {
        self.weather_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingSetting(WEATHER_API_KEY_VAR.to_string()))
    }

    pub fn narrative_api_key(&self) -> Option<&str> {
        self.narrative_api_key.as_deref()
    }

    /// Fail fast when the required weather key is missing
    pub fn require_weather_key(&self) -> Result<(), ConfigError> {
        self.weather_api_key().map(|_| ())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Narrative provider settings
    #[serde(default)]
    pub narrative: NarrativeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            weather: WeatherConfig::default(),
            narrative: NarrativeConfig::default(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating default if it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_dir);

        if !config_path.exists() {
            let config = Self {
                config_dir,
                ..Self::default()
            };
            config.save_to(config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;
        config.config_dir = config_dir;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(&self.narrative.base_url, "narrative.base_url", &mut result);

        validate_timeout(self.weather.timeout_secs, "weather.timeout_secs", &mut result);
        validate_timeout(
            self.narrative.timeout_secs,
            "narrative.timeout_secs",
            &mut result,
        );

        if self.narrative.model.trim().is_empty() {
            result.add_error("narrative.model", "Model identifier must not be empty");
        }

        if !self.narrative.enabled {
            result.add_warning(
                "narrative.enabled",
                "Narrative generation disabled - only raw readings will be shown",
            );
        }

        result
    }

    /// Validate credentials alongside the file-based settings
    pub fn validate_credentials(&self, credentials: &Credentials, result: &mut ValidationResult) {
        if credentials.weather_api_key().is_err() {
            result.add_error(WEATHER_API_KEY_VAR, "Weather API key is not set");
        }
        if self.narrative.enabled && credentials.narrative_api_key().is_none() {
            result.add_warning(
                NARRATIVE_API_KEY_VAR,
                "Narrative API key is not set - descriptions will be unavailable",
            );
        }
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        Ok(config_file_in(dirs::config_dir())?)
    }
}

/// `<platform config dir>/skyscribe/config.toml`
fn config_file_in(platform_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let platform_dir = platform_dir
        .ok_or_else(|| ConfigError::NotFound("platform configuration directory".to_string()))?;
    Ok(platform_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn validate_timeout(secs: u64, field: &str, result: &mut ValidationResult) {
    if secs == 0 {
        result.add_error(field, "Timeout must be greater than 0");
    } else if secs > 120 {
        result.add_warning(field, "Timeout is unusually long (>120 seconds)");
    }
}
