//! Integration tests for OpenWeatherMapProvider using wiremock.
//!
//! These tests verify the provider behavior against a mock HTTP server.

use skyscribe_core::{UnitSystem, WeatherConfig};
use skyscribe_weather::{
    OpenWeatherMapProvider, Temperature, WeatherError, WeatherFetcher, WindSpeed,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a provider response body
fn current_weather(name: &str, temp: f64, humidity: u8, wind_mps: f64, main: &str) -> serde_json::Value {
    serde_json::json!({
        "cod": 200,
        "name": name,
        "dt": 1_760_000_000,
        "main": {"temp": temp, "feels_like": temp - 0.5, "humidity": humidity},
        "wind": {"speed": wind_mps},
        "weather": [{"id": 803, "main": main, "description": "broken clouds"}],
        "sys": {"country": "FR"}
    })
}

fn provider_for(server: &MockServer, units: UnitSystem) -> OpenWeatherMapProvider {
    let config = WeatherConfig {
        base_url: server.uri(),
        units,
        timeout_secs: 5,
    };
    OpenWeatherMapProvider::new(&config, "test_key").unwrap()
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_weather("Paris", 18.0, 60, 2.78, "Cloudy")),
        )
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, UnitSystem::Metric);
    let reading = provider.fetch("Paris").await.unwrap();

    assert_eq!(reading.location(), "Paris");
    assert_eq!(reading.temperature(), Temperature::celsius(18.0));
    assert_eq!(reading.humidity(), 60);
    assert_eq!(reading.wind_speed(), WindSpeed::kmh(10.0));
    assert_eq!(reading.condition(), "Cloudy");
}

#[tokio::test]
async fn test_readings_always_have_location_and_valid_humidity() {
    let mock_server = MockServer::start().await;

    let cases = [("Oslo", 0u8), ("Lima", 100), ("Cairo", 12), ("Tokyo", 73)];
    for (city, humidity) in cases {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", city))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(current_weather(city, 11.0, humidity, 1.0, "Clear")),
            )
            .mount(&mock_server)
            .await;
    }

    let provider = provider_for(&mock_server, UnitSystem::Metric);
    for (city, _) in cases {
        let reading = provider.fetch(city).await.unwrap();
        assert!(!reading.location().is_empty());
        assert!(reading.humidity() <= 100);
    }
}

#[tokio::test]
async fn test_fetch_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, UnitSystem::Metric);
    let result = provider.fetch("Nowhereistan").await;

    assert!(
        matches!(result, Err(WeatherError::LocationNotFound(ref loc)) if loc == "Nowhereistan"),
        "unexpected result: {:?}",
        result
    );
}

#[tokio::test]
async fn test_fetch_invalid_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."
        })))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, UnitSystem::Metric);
    let err = provider.fetch("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::Unauthorized));
}

#[tokio::test]
async fn test_fetch_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, UnitSystem::Metric);
    let err = provider.fetch("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::ServiceUnavailable(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_fetch_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, UnitSystem::Metric);
    let err = provider.fetch("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::RateLimited));
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, UnitSystem::Metric);
    let err = provider.fetch("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::Parse(_)));
}

#[tokio::test]
async fn test_fetch_missing_field_is_not_defaulted() {
    let mock_server = MockServer::start().await;

    let mut body = current_weather("Paris", 18.0, 60, 2.78, "Cloudy");
    body["wind"] = serde_json::json!({});

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, UnitSystem::Metric);
    let err = provider.fetch("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::MissingField("wind.speed")));
}

#[tokio::test]
async fn test_fetch_network_failure() {
    // Bind then release a port so nothing is listening on it
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = WeatherConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        units: UnitSystem::Metric,
        timeout_secs: 2,
    };
    let provider = OpenWeatherMapProvider::new(&config, "test_key").unwrap();
    let err = provider.fetch("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::Network(_)));
    assert!(!err.to_string().contains("test_key"));
}

#[tokio::test]
async fn test_fetch_is_idempotent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_weather("Paris", 18.0, 60, 2.78, "Cloudy")),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, UnitSystem::Metric);
    let first = provider.fetch("Paris").await.unwrap();
    let second = provider.fetch("Paris").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_imperial_units_requested() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("units", "imperial"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_weather("Denver", 64.4, 20, 6.2, "Clear")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, UnitSystem::Imperial);
    let reading = provider.fetch("Denver").await.unwrap();

    assert_eq!(reading.temperature().to_string(), "64.4°F");
    assert_eq!(reading.wind_speed().to_string(), "6.2 mph");
}
