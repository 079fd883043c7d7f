//! Fetch-then-narrate pipeline.
//!
//! Toolkit independent: callers run it on whatever runtime they own and
//! deliver the `Report` back to their UI.

use std::sync::Arc;

use serde::Serialize;
use skyscribe_core::{AppError, Config, Credentials};
use skyscribe_narrative::{GeminiClient, GeneratorError, NarrativeGenerator, NarrativeText};
use skyscribe_weather::{OpenWeatherMapProvider, WeatherError, WeatherFetcher, WeatherReading};

/// Outcome of one successful weather lookup.
///
/// The narrative may have failed independently; the reading is always present.
#[derive(Debug)]
pub struct Report {
    pub reading: WeatherReading,
    pub narrative: Result<NarrativeText, GeneratorError>,
}

impl Report {
    pub fn narrative_text(&self) -> Option<&NarrativeText> {
        self.narrative.as_ref().ok()
    }

    pub fn narrative_error(&self) -> Option<&GeneratorError> {
        self.narrative.as_ref().err()
    }

    /// True when both steps succeeded
    pub fn is_complete(&self) -> bool {
        self.narrative.is_ok()
    }

    /// Serializable view for machine-readable output
    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            reading: &self.reading,
            narrative: self.narrative_text().map(NarrativeText::as_str),
            narrative_error: self.narrative_error().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub reading: &'a WeatherReading,
    pub narrative: Option<&'a str>,
    pub narrative_error: Option<String>,
}

/// Run one query: fetch the reading, then try to narrate it.
///
/// A fetch failure aborts the query before the narrator is called. A narrator
/// failure (or no narrator at all) still yields a `Report`.
pub async fn run_report(
    fetcher: &dyn WeatherFetcher,
    narrator: Option<&dyn NarrativeGenerator>,
    location: &str,
) -> Result<Report, WeatherError> {
    let reading = fetcher.fetch(location).await?;

    let narrative = match narrator {
        Some(narrator) => narrator.narrate(&reading).await,
        None => Err(GeneratorError::MissingApiKey),
    };

    if let Err(e) = &narrative {
        tracing::warn!("Narrative unavailable for {}: {}", reading.location(), e);
    }

    Ok(Report { reading, narrative })
}

/// The two collaborators wired together, shareable across tasks
#[derive(Clone)]
pub struct ReportPipeline {
    fetcher: Arc<dyn WeatherFetcher>,
    narrator: Option<Arc<dyn NarrativeGenerator>>,
}

impl std::fmt::Debug for ReportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportPipeline")
            .field("narrator", &self.narrator.is_some())
            .finish_non_exhaustive()
    }
}

impl ReportPipeline {
    pub fn new(
        fetcher: Arc<dyn WeatherFetcher>,
        narrator: Option<Arc<dyn NarrativeGenerator>>,
    ) -> Self {
        Self { fetcher, narrator }
    }

    /// Build the production pipeline from configuration and credentials.
    ///
    /// Fails only when the weather key is missing or a client cannot be built.
    /// A missing narrative key, or narrative disabled in config, leaves the
    /// narrator out.
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self, AppError> {
        let weather_key = credentials.weather_api_key()?;
        let fetcher = OpenWeatherMapProvider::new(&config.weather, weather_key)?;

        let client = if !config.narrative.enabled {
            tracing::info!("Narrative generation disabled in configuration");
            None
        } else {
            match credentials.narrative_api_key() {
                Some(key) => Some(GeminiClient::new(&config.narrative, key)?),
                None => {
                    tracing::debug!(
                        "{} not set - reports will not include a narrative",
                        skyscribe_core::NARRATIVE_API_KEY_VAR
                    );
                    None
                }
            }
        };

        tracing::info!(
            units = fetcher.units().as_query(),
            model = client.as_ref().map(GeminiClient::model),
            "Report pipeline ready"
        );

        let narrator = client.map(|c| Arc::new(c) as Arc<dyn NarrativeGenerator>);

        Ok(Self::new(Arc::new(fetcher), narrator))
    }

    pub fn has_narrator(&self) -> bool {
        self.narrator.is_some()
    }

    pub async fn run(&self, location: &str) -> Result<Report, WeatherError> {
        run_report(self.fetcher.as_ref(), self.narrator.as_deref(), location).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skyscribe_weather::{ReadingFields, Temperature, WindSpeed};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedFetcher;

    #[async_trait]
    impl WeatherFetcher for FixedFetcher {
        async fn fetch(&self, location: &str) -> Result<WeatherReading, WeatherError> {
            WeatherReading::new(ReadingFields {
                location: location.to_string(),
                country: None,
                temperature: Temperature::celsius(18.0),
                feels_like: Temperature::celsius(18.0),
                humidity: 60,
                wind_speed: WindSpeed::kmh(10.0),
                condition: "Cloudy".into(),
                description: "overcast clouds".into(),
                condition_code: 804,
                observed_at: None,
            })
        }
    }

    #[derive(Default)]
    struct CountingNarrator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NarrativeGenerator for CountingNarrator {
        async fn narrate(&self, reading: &WeatherReading) -> Result<NarrativeText, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            NarrativeText::new(format!("Grey skies over {}.", reading.location()))
        }
    }

    #[tokio::test]
    async fn test_full_report() {
        let narrator = CountingNarrator::default();
        let report = run_report(&FixedFetcher, Some(&narrator), "Paris")
            .await
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(
            report.narrative_text().map(NarrativeText::as_str),
            Some("Grey skies over Paris.")
        );
        assert_eq!(narrator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_without_narrator_is_partial() {
        let report = run_report(&FixedFetcher, None, "Paris").await.unwrap();

        assert!(!report.is_complete());
        assert!(matches!(
            report.narrative_error(),
            Some(GeneratorError::MissingApiKey)
        ));
        assert_eq!(report.reading.location(), "Paris");
    }

    #[test]
    fn test_summary_serializes() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let report = rt
            .block_on(run_report(&FixedFetcher, None, "Paris"))
            .unwrap();

        let json = serde_json::to_value(report.summary()).unwrap();
        assert_eq!(json["reading"]["location"], "Paris");
        assert_eq!(json["reading"]["humidity"], 60);
        assert!(json["narrative"].is_null());
        assert!(json["narrative_error"].is_string());
    }

    #[test]
    fn test_from_config_requires_weather_key() {
        let config = Config::default();
        let err = ReportPipeline::from_config(&config, &Credentials::default()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(skyscribe_core::ConfigError::MissingSetting(_))
        ));
    }

    #[test]
    fn test_from_config_without_narrative_key() {
        let config = Config::default();
        let creds = Credentials::new(Some("owm".into()), None);
        let pipeline = ReportPipeline::from_config(&config, &creds).unwrap();
        assert!(!pipeline.has_narrator());
    }

    #[test]
    fn test_from_config_respects_disabled_narrative() {
        let mut config = Config::default();
        config.narrative.enabled = false;
        let creds = Credentials::new(Some("owm".into()), Some("gemini".into()));
        let pipeline = ReportPipeline::from_config(&config, &creds).unwrap();
        assert!(!pipeline.has_narrator());
    }

    #[test]
    fn test_from_config_with_both_keys() {
        let creds = Credentials::new(Some("owm".into()), Some("gemini".into()));
        let pipeline = ReportPipeline::from_config(&Config::default(), &creds).unwrap();
        assert!(pipeline.has_narrator());
    }
}
