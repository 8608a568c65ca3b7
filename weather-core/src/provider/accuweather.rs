use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::{
    config::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE, ProviderConfig},
    error::ProviderError,
    model::{Coordinate, LocationKey, RawForecastDay},
};

use super::ForecastProvider;

const CITY_SEARCH_PATH: &str = "/locations/v1/cities/search";
const GEOPOSITION_SEARCH_PATH: &str = "/locations/v1/cities/geoposition/search";
const DAILY_FORECAST_PATH: &str = "/forecasts/v1/daily/5day";

#[derive(Debug, Clone)]
pub struct AccuWeatherProvider {
    api_key: String,
    language: String,
    base_url: String,
    http: Client,
}

impl AccuWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            language: DEFAULT_LANGUAGE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &ProviderConfig, api_key: String) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .context("Failed to build HTTP client for AccuWeather")?;

        Ok(Self {
            api_key,
            language: config.language.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    async fn get(&self, path: &str, extra: &[(&str, &str)]) -> Result<Response, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        self.http
            .get(&url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(extra)
            .send()
            .await
            .map_err(transport)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwGeoPosition {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwCity {
    geo_position: AwGeoPosition,
}

#[async_trait]
impl ForecastProvider for AccuWeatherProvider {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn geocode(&self, city: &str) -> Result<Coordinate, ProviderError> {
        let res = self.get(CITY_SEARCH_PATH, &[("q", city)]).await?;

        let status = res.status();
        tracing::info!(city, status = status.as_u16(), "city search");

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let matches: Vec<AwCity> = res.json().await.map_err(transport)?;

        // The provider ranks matches; the first one wins.
        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResult(city.to_string()))?;

        Ok(Coordinate {
            latitude: first.geo_position.latitude,
            longitude: first.geo_position.longitude,
        })
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn location_key(&self, coordinate: Coordinate) -> Result<LocationKey, ProviderError> {
        let q = coordinate.to_string();
        let res = self.get(GEOPOSITION_SEARCH_PATH, &[("q", q.as_str())]).await?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(%coordinate, status = status.as_u16(), "geoposition search failed");
            return Err(ProviderError::LocationKeyNotFound);
        }

        let body: Value = res
            .json()
            .await
            .map_err(|_| ProviderError::LocationKeyNotFound)?;

        body.get("Key")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ProviderError::LocationKeyNotFound)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn daily_forecast(&self, key: &str) -> Result<Vec<RawForecastDay>, ProviderError> {
        let path = format!("{DAILY_FORECAST_PATH}/{key}");
        let res = self
            .get(&path, &[("details", "true"), ("metric", "true")])
            .await?;

        let status = res.status();
        let body = res.text().await.map_err(transport)?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                body = %truncate_body(&body),
                "daily forecast request failed"
            );
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: Value =
            serde_json::from_str(&body).map_err(|_| ProviderError::ForecastMalformed)?;

        match parsed {
            Value::Object(mut map) => match map.remove("DailyForecasts") {
                Some(Value::Array(days)) => Ok(days.into_iter().map(RawForecastDay).collect()),
                _ => Err(ProviderError::ForecastMalformed),
            },
            _ => Err(ProviderError::ForecastMalformed),
        }
    }
}

// The request URL carries the API key, so it never makes it into the message.
fn transport(err: reqwest::Error) -> ProviderError {
    let err = err.without_url();
    let mut detail = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }

    tracing::error!(error = %detail, "provider transport error");
    ProviderError::Transport(detail)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
