pub mod config;
pub mod error;

pub use config::{
    Config, Credentials, NarrativeConfig, UnitSystem, ValidationResult, WeatherConfig,
    NARRATIVE_API_KEY_VAR, WEATHER_API_KEY_VAR,
};
pub use error::{
    AppError, ConfigError, FetchError, NarrativeError, NetworkError, ReqwestErrorExt,
};

use anyhow::Result;

/// Initialize logging for the application.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::info!("Skyscribe core initialized");
    Ok(())
}
