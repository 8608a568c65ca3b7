use crate::{
    config::ProviderConfig,
    error::ProviderError,
    model::{Coordinate, LocationKey, RawForecastDay},
    provider::accuweather::AccuWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod accuweather;

/// The three remote calls a city goes through before its forecast is known.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Resolve a free-text city name to the first matching position.
    async fn geocode(&self, city: &str) -> Result<Coordinate, ProviderError>;

    /// Resolve a position to the provider's location key.
    async fn location_key(&self, coordinate: Coordinate) -> Result<LocationKey, ProviderError>;

    /// Daily forecast records for a location key, in provider order.
    async fn daily_forecast(&self, key: &str) -> Result<Vec<RawForecastDay>, ProviderError>;
}

/// Construct the AccuWeather provider from config and an already resolved API key.
pub fn provider_from_config(
    config: &ProviderConfig,
    api_key: String,
) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let provider = AccuWeatherProvider::from_config(config, api_key)?;
    Ok(Box::new(provider))
}
