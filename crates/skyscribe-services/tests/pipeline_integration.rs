//! End-to-end tests for the report pipeline.
//!
//! Both providers are real clients pointed at wiremock servers.

use std::sync::Arc;
use std::time::Duration;

use skyscribe_core::{
    Config, Credentials, NarrativeConfig, NetworkError, UnitSystem, WeatherConfig,
};
use skyscribe_narrative::{GeminiClient, GeneratorError};
use skyscribe_services::ReportPipeline;
use skyscribe_weather::{OpenWeatherMapProvider, Temperature, WeatherError, WindSpeed};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NARRATIVE: &str = "A mild, cloudy day in Paris with light winds.";

fn paris_weather() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "cod": 200,
        "name": "Paris",
        "main": {"temp": 18.0, "feels_like": 17.6, "humidity": 60},
        "wind": {"speed": 2.78},
        "weather": [{"id": 804, "main": "Cloudy", "description": "overcast clouds"}]
    }))
}

fn narrative_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}, "finishReason": "STOP"}]
    }))
}

fn pipeline(weather: &MockServer, narrative: &MockServer, narrative_timeout: u64) -> ReportPipeline {
    let fetcher = OpenWeatherMapProvider::new(
        &WeatherConfig {
            base_url: weather.uri(),
            units: UnitSystem::Metric,
            timeout_secs: 5,
        },
        "owm_key",
    )
    .unwrap();

    let narrator = GeminiClient::new(
        &NarrativeConfig {
            base_url: narrative.uri(),
            model: "gemini-test".to_string(),
            timeout_secs: narrative_timeout,
            enabled: true,
        },
        "gemini_key",
    )
    .unwrap();

    ReportPipeline::new(Arc::new(fetcher), Some(Arc::new(narrator)))
}

#[tokio::test]
async fn test_paris_full_success() {
    let weather = MockServer::start().await;
    let narrative = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(paris_weather())
        .expect(1)
        .mount(&weather)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(narrative_response(NARRATIVE))
        .expect(1)
        .mount(&narrative)
        .await;

    let report = pipeline(&weather, &narrative, 5).run("Paris").await.unwrap();

    assert_eq!(report.reading.location(), "Paris");
    assert_eq!(report.reading.temperature(), Temperature::celsius(18.0));
    assert_eq!(report.reading.humidity(), 60);
    assert_eq!(report.reading.wind_speed(), WindSpeed::kmh(10.0));
    assert_eq!(report.reading.condition(), "Cloudy");
    assert_eq!(report.narrative_text().map(|n| n.as_str()), Some(NARRATIVE));
    assert!(report.narrative_error().is_none());
}

#[tokio::test]
async fn test_unknown_location_skips_narrative() {
    let weather = MockServer::start().await;
    let narrative = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .expect(1)
        .mount(&weather)
        .await;

    Mock::given(method("POST"))
        .respond_with(narrative_response(NARRATIVE))
        .expect(0)
        .mount(&narrative)
        .await;

    let result = pipeline(&weather, &narrative, 5).run("Nowhereistan").await;

    assert!(
        matches!(result, Err(WeatherError::LocationNotFound(ref loc)) if loc == "Nowhereistan"),
        "unexpected result: {:?}",
        result
    );
}

#[tokio::test]
async fn test_narrative_timeout_is_partial_success() {
    let weather = MockServer::start().await;
    let narrative = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(paris_weather())
        .mount(&weather)
        .await;

    Mock::given(method("POST"))
        .respond_with(narrative_response(NARRATIVE).set_delay(Duration::from_secs(3)))
        .mount(&narrative)
        .await;

    let report = pipeline(&weather, &narrative, 1).run("Paris").await.unwrap();

    assert_eq!(report.reading.location(), "Paris");
    assert!(report.narrative_text().is_none());
    assert!(matches!(
        report.narrative_error(),
        Some(GeneratorError::Network(NetworkError::Timeout))
    ));
}

#[tokio::test]
async fn test_both_providers_failing_reports_fetch_error() {
    let weather = MockServer::start().await;
    let narrative = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&weather)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&narrative)
        .await;

    let err = pipeline(&weather, &narrative, 5).run("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn test_missing_narrative_key_from_config() {
    let weather = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(paris_weather())
        .mount(&weather)
        .await;

    let mut config = Config::default();
    config.weather.base_url = weather.uri();
    let creds = Credentials::new(Some("owm_key".into()), None);

    let report = ReportPipeline::from_config(&config, &creds)
        .unwrap()
        .run("Paris")
        .await
        .unwrap();

    assert_eq!(report.reading.humidity(), 60);
    assert!(matches!(
        report.narrative_error(),
        Some(GeneratorError::MissingApiKey)
    ));
}

#[tokio::test]
async fn test_repeated_queries_are_independent() {
    let weather = MockServer::start().await;
    let narrative = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(paris_weather())
        .expect(2)
        .mount(&weather)
        .await;

    Mock::given(method("POST"))
        .respond_with(narrative_response(NARRATIVE))
        .expect(2)
        .mount(&narrative)
        .await;

    let pipeline = pipeline(&weather, &narrative, 5);
    let first = pipeline.run("Paris").await.unwrap();
    let second = pipeline.run("Paris").await.unwrap();

    assert_eq!(first.reading, second.reading);
    assert_eq!(first.narrative_text(), second.narrative_text());
}
