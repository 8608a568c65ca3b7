//! Core library for route weather forecasts.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The AccuWeather provider behind the `ForecastProvider` seam
//! - Normalization of daily forecast records
//! - The strict and lenient route pipelines and the chart description
//!
//! It is used by `weather-web`, but can also be reused by other binaries or services.

pub mod chart;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod route_store;

pub use chart::{Chart, ChartData, Series, build_chart};
pub use config::{Config, ProviderConfig, ServerConfig};
pub use error::{BLANK_ROUTE_MESSAGE, CityFailure, ProviderError, Stage, StrictError};
pub use model::{
    City, CityForecast, Coordinate, DayCount, LocationKey, NormalizedDay, RawForecastDay,
    Reading, Route, RouteResult,
};
pub use normalize::{normalize_day, normalize_days};
pub use pipeline::{LenientResult, run_lenient, run_strict};
pub use provider::{ForecastProvider, accuweather::AccuWeatherProvider, provider_from_config};
pub use route_store::{RouteId, RouteStore};
