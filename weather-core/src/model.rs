use serde::{Serialize, Serializer};
use std::fmt;

/// Free-text city name exactly as submitted.
pub type City = String;

/// Opaque location identifier assigned by the provider.
pub type LocationKey = String;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// One entry of the provider's `DailyForecasts` list, kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecastDay(pub serde_json::Value);

impl RawForecastDay {
    pub fn pointer(&self, path: &str) -> Option<&serde_json::Value> {
        self.0.pointer(path)
    }
}

/// An optional numeric reading. The provider omits some fields on some days.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Reading {
    Value(f64),
    #[default]
    Unavailable,
}

impl Reading {
    pub const UNAVAILABLE: &'static str = "unavailable";

    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(*v),
            Reading::Unavailable => None,
        }
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Value(v) => serializer.serialize_f64(*v),
            Reading::Unavailable => serializer.serialize_str(Self::UNAVAILABLE),
        }
    }
}

/// Uniform per-day record handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedDay {
    pub date: String,
    pub temperature: f64,
    pub humidity: Reading,
    pub wind_speed: f64,
    pub rain_probability: Reading,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<City>,
}

impl NormalizedDay {
    /// Numeric fields a chart can plot.
    pub const PLOTTABLE: &'static [&'static str] =
        &["temperature", "humidity", "wind_speed", "rain_probability"];

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = Some(city.to_string());
        self
    }

    /// Numeric value of a plottable field, `None` when it is not numeric or unavailable.
    pub fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "temperature" => Some(self.temperature),
            "wind_speed" => Some(self.wind_speed),
            "humidity" => self.humidity.value(),
            "rain_probability" => self.rain_probability.value(),
            _ => None,
        }
    }
}

/// Ordered list of cities from one form submission.
///
/// Blank entries are kept in place; only the all-blank route is rejected,
/// and that happens in the strict pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Route {
    cities: Vec<City>,
}

impl Route {
    pub fn new(cities: Vec<City>) -> Self {
        Self { cities }
    }

    /// `start`, then every intermediate city, then `end`.
    pub fn from_form(start: City, intermediates: Vec<City>, end: City) -> Self {
        let mut cities = Vec::with_capacity(intermediates.len() + 2);
        cities.push(start);
        cities.extend(intermediates);
        cities.push(end);
        Self { cities }
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.cities.iter().all(|c| c.trim().is_empty())
    }
}

/// Forecast of one city in a strict-mode result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityForecast {
    pub city: City,
    pub days: Vec<NormalizedDay>,
}

/// Successful strict-mode result, in route order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteResult {
    pub cities: Vec<CityForecast>,
}

impl RouteResult {
    /// Insert or replace the entry for `city`. A repeated city keeps its first
    /// position and takes the latest forecast.
    pub fn insert(&mut self, city: City, days: Vec<NormalizedDay>) {
        match self.cities.iter_mut().find(|c| c.city == city) {
            Some(existing) => existing.days = days,
            None => self.cities.push(CityForecast { city, days }),
        }
    }

    pub fn get(&self, city: &str) -> Option<&[NormalizedDay]> {
        self.cities
            .iter()
            .find(|c| c.city == city)
            .map(|c| c.days.as_slice())
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// Day-count control of the chart: 3, 5 or 7 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayCount {
    Three,
    #[default]
    Five,
    Seven,
}

impl DayCount {
    pub fn days(self) -> usize {
        match self {
            DayCount::Three => 3,
            DayCount::Five => 5,
            DayCount::Seven => 7,
        }
    }

    pub const fn all() -> &'static [DayCount] {
        &[DayCount::Three, DayCount::Five, DayCount::Seven]
    }
}

impl TryFrom<u32> for DayCount {
    type Error = anyhow::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(DayCount::Three),
            5 => Ok(DayCount::Five),
            7 => Ok(DayCount::Seven),
            _ => Err(anyhow::anyhow!(
                "Unsupported day count {value}. Supported values: 3, 5, 7."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_keeps_blank_entries_in_place() {
        let route = Route::from_form(
            "Москва".into(),
            vec!["".into(), "  ".into()],
            "Казань".into(),
        );

        assert_eq!(route.len(), 4);
        assert_eq!(route.cities()[1], "");
        assert!(!route.is_blank());
    }

    #[test]
    fn route_of_blanks_is_blank() {
        let route = Route::from_form(" ".into(), vec![], "".into());
        assert_eq!(route.len(), 2);
        assert!(route.is_blank());
    }

    #[test]
    fn route_result_replaces_repeated_city() {
        let day = NormalizedDay {
            date: "2024-05-01T07:00:00+03:00".into(),
            temperature: 20.0,
            humidity: Reading::Unavailable,
            wind_speed: 3.0,
            rain_probability: Reading::Value(10.0),
            city: None,
        };
        let mut result = RouteResult::default();
        result.insert("Москва".into(), vec![day.clone()]);
        result.insert("Тверь".into(), vec![]);
        result.insert("Москва".into(), vec![day.clone(), day]);

        assert_eq!(result.len(), 2);
        assert_eq!(result.cities[0].city, "Москва");
        assert_eq!(result.get("Москва").map(<[_]>::len), Some(2));
    }

    #[test]
    fn reading_serializes_sentinel() {
        let json = serde_json::to_value([Reading::Value(42.0), Reading::Unavailable]).unwrap();
        assert_eq!(json, serde_json::json!([42.0, "unavailable"]));
    }

    #[test]
    fn day_count_accepts_only_supported_values() {
        for dc in DayCount::all() {
            let parsed = DayCount::try_from(dc.days() as u32).expect("roundtrip should succeed");
            assert_eq!(*dc, parsed);
        }
        let err = DayCount::try_from(4).unwrap_err();
        assert!(err.to_string().contains("Unsupported day count"));
    }
}
