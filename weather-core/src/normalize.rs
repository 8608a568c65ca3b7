use serde_json::Value;

use crate::{
    error::ProviderError,
    model::{NormalizedDay, RawForecastDay, Reading},
};

const TEMPERATURE: &str = "/Temperature/Maximum/Value";
const WIND_SPEED: &str = "/Day/Wind/Speed/Value";
const DATE: &str = "/Date";
const HUMIDITY: &str = "/Day/RelativeHumidity";
const RAIN_PROBABILITY: &str = "/Day/PrecipitationProbability";

/// Extract the fixed field set from one provider day.
///
/// Maximum temperature, wind speed and date are mandatory: a day missing any of
/// them yields `FieldMissing` and never a partial record. Humidity and rain
/// probability fall back to [`Reading::Unavailable`].
pub fn normalize_day(raw: &RawForecastDay) -> Result<NormalizedDay, ProviderError> {
    let day_label = || {
        raw.pointer(DATE)
            .and_then(Value::as_str)
            .unwrap_or("<undated>")
            .to_string()
    };

    let temperature = mandatory_f64(raw, TEMPERATURE).ok_or_else(|| ProviderError::FieldMissing {
        day: day_label(),
        field: "Temperature.Maximum.Value",
    })?;
    let wind_speed = mandatory_f64(raw, WIND_SPEED).ok_or_else(|| ProviderError::FieldMissing {
        day: day_label(),
        field: "Day.Wind.Speed.Value",
    })?;
    let date = raw
        .pointer(DATE)
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::FieldMissing {
            day: day_label(),
            field: "Date",
        })?
        .to_string();

    Ok(NormalizedDay {
        date,
        temperature,
        humidity: optional_reading(raw.pointer(HUMIDITY)),
        wind_speed,
        rain_probability: optional_reading(raw.pointer(RAIN_PROBABILITY)),
        city: None,
    })
}

/// Normalize every day, dropping the ones that fail.
pub fn normalize_days<'a>(
    raw: impl IntoIterator<Item = &'a RawForecastDay>,
) -> Vec<NormalizedDay> {
    raw.into_iter()
        .filter_map(|day| match normalize_day(day) {
            Ok(normalized) => Some(normalized),
            Err(err) => {
                tracing::warn!(error = %err, "dropping forecast day");
                None
            }
        })
        .collect()
}

fn mandatory_f64(raw: &RawForecastDay, path: &str) -> Option<f64> {
    raw.pointer(path).and_then(Value::as_f64)
}

// Detailed forecasts report relative humidity as {Minimum, Maximum, Average}.
fn optional_reading(value: Option<&Value>) -> Reading {
    match value {
        Some(Value::Number(n)) => n.as_f64().map(Reading::Value).unwrap_or_default(),
        Some(Value::Object(map)) => map
            .get("Average")
            .and_then(Value::as_f64)
            .map(Reading::Value)
            .unwrap_or_default(),
        _ => Reading::Unavailable,
    }
}
