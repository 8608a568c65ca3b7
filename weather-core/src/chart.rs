use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::cmp::Ordering;

use crate::{model::NormalizedDay, pipeline::LenientResult};

pub const CHART_TITLE: &str = "Прогноз погоды для городов";
pub const EMPTY_TITLE: &str = "Нет данных для отображения";

/// Display label of a plottable parameter.
pub fn parameter_label(parameter: &str) -> &str {
    match parameter {
        "temperature" => "Температура",
        "wind_speed" => "Скорость ветра",
        "rain_probability" => "Вероятность осадков",
        "humidity" => "Влажность",
        other => other,
    }
}

/// One line of the chart: a parameter of a city, aligned to [`ChartData::dates`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub city: String,
    pub parameter: String,
    pub label: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub dates: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Chart {
    Ok(ChartData),
    Empty { title: String },
}

impl Chart {
    pub fn empty() -> Self {
        Chart::Empty {
            title: EMPTY_TITLE.to_string(),
        }
    }
}

/// Turn a lenient run into a chart keyed by date, one series per city per parameter.
pub fn build_chart(result: &LenientResult, parameters: &[String]) -> Chart {
    let LenientResult::Records { days, .. } = result else {
        return Chart::empty();
    };

    let dates = ordered_dates(days);

    let mut cities: Vec<&str> = Vec::new();
    for city in days.iter().filter_map(|d| d.city.as_deref()) {
        if !cities.contains(&city) {
            cities.push(city);
        }
    }

    let mut series = Vec::with_capacity(cities.len() * parameters.len());
    for city in &cities {
        for parameter in parameters {
            let values = dates
                .iter()
                .map(|date| {
                    days.iter()
                        .find(|d| d.city.as_deref() == Some(*city) && &d.date == date)
                        .and_then(|d| d.numeric(parameter))
                })
                .collect();

            series.push(Series {
                city: city.to_string(),
                parameter: parameter.clone(),
                label: format!("{city} — {}", parameter_label(parameter)),
                values,
            });
        }
    }

    Chart::Ok(ChartData {
        title: CHART_TITLE.to_string(),
        dates,
        series,
    })
}

/// Distinct dates in chronological order. Dates that don't parse as RFC 3339
/// sort after the parsed ones, by text.
fn ordered_dates(days: &[NormalizedDay]) -> Vec<String> {
    let mut dates: Vec<String> = Vec::new();
    for day in days {
        if !dates.contains(&day.date) {
            dates.push(day.date.clone());
        }
    }

    dates.sort_by(|a, b| {
        match (
            DateTime::<FixedOffset>::parse_from_rfc3339(a),
            DateTime::<FixedOffset>::parse_from_rfc3339(b),
        ) {
            (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        }
    });

    dates
}
