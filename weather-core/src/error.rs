use std::fmt;
use thiserror::Error;

use crate::model::City;

/// Message shown when the submitted route contains no city at all.
pub const BLANK_ROUTE_MESSAGE: &str = "Пожалуйста, введите хотя бы один город.";

/// Failure of a single provider call or of normalizing a single day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("no location data for city '{0}'")]
    EmptyResult(City),

    #[error("failed to reach provider: {0}")]
    Transport(String),

    #[error("no location key found")]
    LocationKeyNotFound,

    #[error("forecast response has no DailyForecasts list")]
    ForecastMalformed,

    #[error("forecast day {day} is missing {field}")]
    FieldMissing { day: String, field: &'static str },
}

/// Resolution stage a city failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Geocode,
    LocationKey,
    Forecast,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Geocode => "geocode",
            Stage::LocationKey => "location-key",
            Stage::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Failed(stage, reason)` state of one city.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} failed for '{city}': {error}")]
pub struct CityFailure {
    pub city: City,
    pub stage: Stage,
    #[source]
    pub error: ProviderError,
}

impl CityFailure {
    pub fn new(city: &str, stage: Stage, error: ProviderError) -> Self {
        Self {
            city: city.to_string(),
            stage,
            error,
        }
    }

    /// Message shown to the user when this failure aborts a strict run.
    pub fn user_message(&self) -> String {
        match (self.stage, &self.error) {
            (Stage::Geocode, ProviderError::Http { status, .. }) => {
                format!("Ошибка при получении координат: HTTP статус {status}")
            }
            (Stage::Geocode, ProviderError::EmptyResult(city)) => {
                format!("Нет данных о местоположении для города: {}", city.trim())
            }
            (Stage::Geocode, ProviderError::Transport(detail)) => {
                format!("Ошибка при подключении к серверу: {detail}")
            }
            (Stage::Geocode, other) => format!("Ошибка при получении координат: {other}"),
            (Stage::LocationKey, _) => {
                format!("Не удалось получить ключ местоположения для {}", self.city)
            }
            (Stage::Forecast, _) => "Ошибка при получении прогноза погоды".to_string(),
        }
    }
}

/// Terminating error of a strict-mode run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrictError {
    #[error("route contains no city")]
    BlankRoute,

    #[error(transparent)]
    City(#[from] CityFailure),
}

impl StrictError {
    pub fn user_message(&self) -> String {
        match self {
            StrictError::BlankRoute => BLANK_ROUTE_MESSAGE.to_string(),
            StrictError::City(failure) => failure.user_message(),
        }
    }
}
