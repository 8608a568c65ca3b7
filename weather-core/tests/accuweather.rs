//! Integration tests for AccuWeatherProvider and the route pipelines using wiremock.

use serde_json::json;
use weather_core::{
    AccuWeatherProvider, Coordinate, DayCount, ForecastProvider, LenientResult, ProviderError,
    Reading, Route, StrictError, run_lenient, run_strict,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn provider(server: &MockServer) -> AccuWeatherProvider {
    AccuWeatherProvider::new(API_KEY.to_string()).with_base_url(&server.uri())
}

fn forecast_day(date: &str, temperature: f64) -> serde_json::Value {
    json!({
        "Date": date,
        "Temperature": {
            "Minimum": { "Value": temperature - 8.0, "Unit": "C" },
            "Maximum": { "Value": temperature, "Unit": "C" }
        },
        "Day": {
            "Wind": { "Speed": { "Value": 11.1, "Unit": "km/h" } },
            "RelativeHumidity": { "Minimum": 45, "Maximum": 90, "Average": 66 },
            "PrecipitationProbability": 40
        }
    })
}

fn five_day_forecast() -> serde_json::Value {
    json!({
        "Headline": { "Text": "Облачно" },
        "DailyForecasts": (1..=5)
            .map(|n| forecast_day(&format!("2024-05-0{n}T07:00:00+03:00"), 14.0 + n as f64))
            .collect::<Vec<_>>()
    })
}

/// Mount the three endpoints for one city: `q` → coordinate → `key` → forecast.
async fn mount_city(server: &MockServer, city: &str, lat: f64, lon: f64, key: &str) {
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .and(query_param("q", city))
        .and(query_param("apikey", API_KEY))
        .and(query_param("language", "ru-ru"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Key": key, "LocalizedName": city, "GeoPosition": { "Latitude": lat, "Longitude": lon } },
            { "Key": "other", "LocalizedName": city, "GeoPosition": { "Latitude": 0.0, "Longitude": 0.0 } }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/geoposition/search"))
        .and(query_param("q", format!("{lat},{lon}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": key })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/forecasts/v1/daily/5day/{key}")))
        .and(query_param("details", "true"))
        .and(query_param("metric", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(five_day_forecast()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn geocode_uses_first_match() {
    let server = MockServer::start().await;
    mount_city(&server, "Москва", 55.75, 37.62, "294021").await;

    let coordinate = provider(&server).geocode("Москва").await.unwrap();

    assert_eq!(
        coordinate,
        Coordinate {
            latitude: 55.75,
            longitude: 37.62
        }
    );
}

#[tokio::test]
async fn geocode_empty_list_names_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = provider(&server).geocode("Атлантида").await.unwrap_err();

    assert_eq!(err, ProviderError::EmptyResult("Атлантида".into()));
}

#[tokio::test]
async fn geocode_http_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("ServiceUnavailable"))
        .mount(&server)
        .await;

    let err = provider(&server).geocode("Москва").await.unwrap_err();

    assert!(matches!(err, ProviderError::Http { status: 503, .. }));
}

/// Base URL of a local port nothing listens on.
fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn geocode_unreachable_server_is_transport_error() {
    let err = AccuWeatherProvider::new(API_KEY.to_string())
        .with_base_url(&closed_port_uri())
        .geocode("Москва")
        .await
        .unwrap_err();

    let detail = match err {
        ProviderError::Transport(detail) => detail,
        other => panic!("expected transport error, got {other:?}"),
    };
    assert!(!detail.contains(API_KEY));
    assert!(!detail.contains("apikey"));
}

#[tokio::test]
async fn strict_route_reports_transport_error_without_api_key() {
    let provider =
        AccuWeatherProvider::new(API_KEY.to_string()).with_base_url(&closed_port_uri());
    let route = Route::from_form("Москва".into(), vec![], "Казань".into());

    let err = run_strict(&provider, &route).await.unwrap_err();

    let message = err.user_message();
    assert!(message.starts_with("Ошибка при подключении к серверу:"));
    assert!(!message.contains(API_KEY));
}

#[tokio::test]
async fn location_key_conflates_status_and_missing_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/geoposition/search"))
        .and(query_param("q", "1,2"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/geoposition/search"))
        .and(query_param("q", "3,4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Type": "City" })))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let unauthorized = provider
        .location_key(Coordinate {
            latitude: 1.0,
            longitude: 2.0,
        })
        .await
        .unwrap_err();
    let missing = provider
        .location_key(Coordinate {
            latitude: 3.0,
            longitude: 4.0,
        })
        .await
        .unwrap_err();

    assert_eq!(unauthorized, ProviderError::LocationKeyNotFound);
    assert_eq!(missing, ProviderError::LocationKeyNotFound);
}

#[tokio::test]
async fn daily_forecast_keeps_provider_order() {
    let server = MockServer::start().await;
    mount_city(&server, "Москва", 55.75, 37.62, "294021").await;

    let days = provider(&server).daily_forecast("294021").await.unwrap();

    assert_eq!(days.len(), 5);
    assert_eq!(
        days[0].pointer("/Date").and_then(|v| v.as_str()),
        Some("2024-05-01T07:00:00+03:00")
    );
    assert_eq!(
        days[4].pointer("/Date").and_then(|v| v.as_str()),
        Some("2024-05-05T07:00:00+03:00")
    );
}

#[tokio::test]
async fn daily_forecast_without_list_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecasts/v1/daily/5day/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Headline": {} })))
        .mount(&server)
        .await;

    let err = provider(&server).daily_forecast("1").await.unwrap_err();

    assert_eq!(err, ProviderError::ForecastMalformed);
}

#[tokio::test]
async fn daily_forecast_http_error_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecasts/v1/daily/5day/1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("The allowed number of requests has been exceeded."))
        .mount(&server)
        .await;

    let err = provider(&server).daily_forecast("1").await.unwrap_err();

    assert_eq!(
        err,
        ProviderError::Http {
            status: 503,
            body: "The allowed number of requests has been exceeded.".into(),
        }
    );
}

#[tokio::test]
async fn strict_route_over_http() {
    let server = MockServer::start().await;
    mount_city(&server, "Москва", 55.75, 37.62, "294021").await;
    mount_city(&server, "Казань", 55.79, 49.12, "295954").await;

    let route = Route::from_form("Москва".into(), vec![], "Казань".into());
    let result = run_strict(&provider(&server), &route).await.unwrap();

    assert_eq!(result.len(), 2);
    let moscow = result.get("Москва").unwrap();
    assert_eq!(moscow.len(), 5);
    assert_eq!(moscow[0].temperature, 15.0);
    assert_eq!(moscow[0].humidity, Reading::Value(66.0));
    assert_eq!(moscow[0].rain_probability, Reading::Value(40.0));
}

#[tokio::test]
async fn strict_route_reports_unknown_city() {
    let server = MockServer::start().await;
    mount_city(&server, "Москва", 55.75, 37.62, "294021").await;
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .and(query_param("q", "Атлантида"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let route = Route::from_form("Москва".into(), vec![], "Атлантида".into());
    let err = run_strict(&provider(&server), &route).await.unwrap_err();

    assert!(matches!(err, StrictError::City(_)));
    assert_eq!(
        err.user_message(),
        "Нет данных о местоположении для города: Атлантида"
    );
}

#[tokio::test]
async fn lenient_route_over_http_truncates_to_day_count() {
    let server = MockServer::start().await;
    mount_city(&server, "Москва", 55.75, 37.62, "294021").await;

    let route = Route::from_form("Москва".into(), vec![], "Нигде".into());
    let result = run_lenient(
        &provider(&server),
        &route,
        DayCount::Three,
        &["temperature".to_string()],
    )
    .await;

    let LenientResult::Records { days, skipped } = result else {
        panic!("expected records");
    };
    assert_eq!(days.len(), 3);
    assert!(days.iter().all(|d| d.city.as_deref() == Some("Москва")));
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].city, "Нигде");
}
