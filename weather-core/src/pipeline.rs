//! City-to-forecast resolution over a whole route.
//!
//! Every city goes `Pending → Geocoded → Located → Fetched → Normalized`, or
//! stops in `Failed(stage, reason)`. [`run_strict`] aborts the route on the
//! first failure; [`run_lenient`] skips the failed city and carries on.

use crate::{
    error::{CityFailure, Stage, StrictError},
    model::{DayCount, NormalizedDay, Route, RouteResult},
    normalize::normalize_days,
    provider::ForecastProvider,
};

/// Outcome of resolving one city.
pub type CityOutcome = Result<Vec<NormalizedDay>, CityFailure>;

/// Run the three provider stages and normalize the result for a single city.
///
/// With `limit`, only the first `limit` forecast days are normalized.
pub async fn resolve_city(
    provider: &dyn ForecastProvider,
    city: &str,
    limit: Option<usize>,
) -> CityOutcome {
    let coordinate = provider
        .geocode(city)
        .await
        .map_err(|e| CityFailure::new(city, Stage::Geocode, e))?;
    tracing::debug!(city, %coordinate, "geocoded");

    let key = provider
        .location_key(coordinate)
        .await
        .map_err(|e| CityFailure::new(city, Stage::LocationKey, e))?;
    tracing::debug!(city, key = %key, "located");

    let forecast = provider
        .daily_forecast(&key)
        .await
        .map_err(|e| CityFailure::new(city, Stage::Forecast, e))?;
    tracing::debug!(city, days = forecast.len(), "fetched");

    let take = limit.unwrap_or(forecast.len());
    let days = normalize_days(forecast.iter().take(take));
    tracing::debug!(city, days = days.len(), "normalized");

    Ok(days)
}

/// Resolve every city of the route, aborting on the first failure.
///
/// A route whose entries are all blank is rejected before any provider call.
pub async fn run_strict(
    provider: &dyn ForecastProvider,
    route: &Route,
) -> Result<RouteResult, StrictError> {
    if route.is_blank() {
        return Err(StrictError::BlankRoute);
    }

    let mut result = RouteResult::default();
    for city in route.cities() {
        let days = resolve_city(provider, city, None).await.inspect_err(|failure| {
            tracing::info!(error = %failure, "route aborted");
        })?;
        result.insert(city.clone(), days);
    }

    Ok(result)
}

/// Result of a lenient run.
#[derive(Debug, Clone, PartialEq)]
pub enum LenientResult {
    /// City-tagged records of every city that resolved, in route order.
    Records {
        days: Vec<NormalizedDay>,
        skipped: Vec<CityFailure>,
    },
    /// No records, or a selected parameter that no record carries.
    NothingToDisplay { skipped: Vec<CityFailure> },
}

impl LenientResult {
    pub fn skipped(&self) -> &[CityFailure] {
        match self {
            LenientResult::Records { skipped, .. } | LenientResult::NothingToDisplay { skipped } => {
                skipped
            }
        }
    }
}

/// Resolve every city of the route, skipping those that fail.
///
/// Each forecast is cut to `day_count` days and every record is tagged with
/// its city. `parameters` are the fields the caller intends to display.
pub async fn run_lenient(
    provider: &dyn ForecastProvider,
    route: &Route,
    day_count: DayCount,
    parameters: &[String],
) -> LenientResult {
    let mut days = Vec::new();
    let mut skipped = Vec::new();

    for city in route.cities() {
        match resolve_city(provider, city, Some(day_count.days())).await {
            Ok(city_days) if city_days.is_empty() => {
                tracing::warn!(city = %city, "no forecast days for city, skipping");
            }
            Ok(city_days) => {
                days.extend(city_days.into_iter().map(|d| d.with_city(city)));
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "skipping city");
                skipped.push(failure);
            }
        }
    }

    if days.is_empty() {
        tracing::info!("nothing to display: no forecast records");
        return LenientResult::NothingToDisplay { skipped };
    }

    if parameters.is_empty() {
        tracing::info!("nothing to display: no parameter selected");
        return LenientResult::NothingToDisplay { skipped };
    }

    if let Some(unknown) = parameters
        .iter()
        .find(|p| !NormalizedDay::PLOTTABLE.contains(&p.as_str()))
    {
        tracing::info!(parameter = %unknown, "nothing to display: parameter missing from records");
        return LenientResult::NothingToDisplay { skipped };
    }

    LenientResult::Records { days, skipped }
}
