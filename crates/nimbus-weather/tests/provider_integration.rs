//! Integration tests for ForecastProvider and WeatherService using wiremock.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use nimbus_core::WeatherConfig;
use nimbus_weather::{
    AreaQuery, FetchError, ForecastProvider, ForecastSource, RefreshOutcome, WeatherService,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORECAST_PATH: &str = "/v1/environment/2-hour-weather-forecast";

/// Helper to build a provider-shaped payload
fn payload(forecasts: &[(&str, &str)]) -> serde_json::Value {
    serde_json::json!({
        "area_metadata": [],
        "items": [{
            "update_timestamp": "2026-01-30T11:50:00+08:00",
            "timestamp": "2026-01-30T11:30:00+08:00",
            "valid_period": {
                "start": "2026-01-30T11:30:00+08:00",
                "end": "2026-01-30T13:30:00+08:00"
            },
            "forecasts": forecasts
                .iter()
                .map(|(area, forecast)| serde_json::json!({"area": area, "forecast": forecast}))
                .collect::<Vec<_>>()
        }],
        "api_info": {"status": "healthy"}
    })
}

fn config_for(server: &MockServer) -> WeatherConfig {
    WeatherConfig {
        endpoint: format!("{}{}", server.uri(), FORECAST_PATH),
        timeout_secs: 2,
        ..WeatherConfig::default()
    }
}

fn provider_for(server: &MockServer, timeout: Duration) -> ForecastProvider {
    ForecastProvider::new(
        &format!("{}{}", server.uri(), FORECAST_PATH),
        timeout,
        "nimbus-test",
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(header("user-agent", "nimbus-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload(&[
            ("Ang Mo Kio", "Partly Cloudy (Day)"),
            ("Bedok", "Thundery Showers"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, Duration::from_secs(2));
    let batch = provider.fetch().await.unwrap();

    assert_eq!(batch.forecasts.len(), 2);
    assert_eq!(batch.forecasts[0].area, "Ang Mo Kio");
    assert_eq!(batch.forecasts[1].forecast, "Thundery Showers");
}

#[tokio::test]
async fn test_fetch_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, Duration::from_secs(2));
    let err = provider.fetch().await.unwrap_err();

    // One request only, no retry
    assert_eq!(err, FetchError::UpstreamStatus(503));
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, Duration::from_secs(2));
    assert!(matches!(
        provider.fetch().await,
        Err(FetchError::InvalidShape(_))
    ));
}

#[tokio::test]
async fn test_fetch_empty_items() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
        )
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, Duration::from_secs(2));
    assert!(matches!(
        provider.fetch().await,
        Err(FetchError::InvalidShape(_))
    ));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(payload(&[("Bedok", "Fair")]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server, Duration::from_millis(100));
    assert!(matches!(
        provider.fetch().await,
        Err(FetchError::Unreachable(_))
    ));
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    // Nothing listens on port 1
    let uri = "http://127.0.0.1:1/forecast";

    let provider = ForecastProvider::new(uri, Duration::from_secs(1), "nimbus-test").unwrap();
    assert!(matches!(
        provider.fetch().await,
        Err(FetchError::Unreachable(_))
    ));
}

#[tokio::test]
async fn test_service_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload(&[
            ("Orchard", "Heavy Thundery Showers"),
            ("Sentosa", "Fair (Day)"),
        ])))
        .mount(&mock_server)
        .await;

    let service = WeatherService::from_config(&config_for(&mock_server)).unwrap();
    assert_eq!(service.start().await, RefreshOutcome::Installed { areas: 2 });

    let weather = service
        .get_weather_for_area(&AreaQuery::from("orchard road"))
        .into_weather()
        .unwrap();
    assert_eq!(weather.entry.area, "Orchard");
    assert!(weather.classification.warning);

    service.stop().await;
}

#[tokio::test]
async fn test_service_keeps_snapshot_when_upstream_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload(&[
            ("Bedok", "Fair"),
            ("Yishun", "Cloudy"),
        ])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    let service = WeatherService::from_config(&config_for(&mock_server)).unwrap();
    service.refresh_now().await;
    assert_eq!(service.get_all_areas(), vec!["Bedok", "Yishun"]);

    mock_server.reset().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    assert_eq!(
        service.refresh_now().await,
        RefreshOutcome::Failed(FetchError::UpstreamStatus(500))
    );
    assert_eq!(service.get_all_areas(), vec!["Bedok", "Yishun"]);
    assert!(service.resolve("yishun").is_found());
}
