use anyhow::Context;
use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use weather_core::{
    Chart, DayCount, ForecastProvider, Route, RouteId, RouteStore, build_chart, run_lenient,
    run_strict,
};

use crate::render;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const CHART_JS: &str = include_str!("../assets/chart.js");

const DEFAULT_PARAMETER: &str = "temperature";

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ForecastProvider>,
    pub routes: Arc<RouteStore>,
}

impl AppState {
    pub fn new(provider: Arc<dyn ForecastProvider>) -> Self {
        Self {
            provider,
            routes: Arc::new(RouteStore::default()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/weather", post(submit_route))
        .route("/chart", get(chart_data))
        .route("/static/chart.js", get(chart_script))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn serve(bind: &str, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind listener on {bind}"))?;
    tracing::info!(%bind, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

/// Fields of the route form. Missing fields read as empty.
#[derive(Debug, Default, PartialEq)]
struct RouteForm {
    start: String,
    intermediates: Vec<String>,
    end: String,
}

impl RouteForm {
    fn parse(body: &str) -> Self {
        let mut form = RouteForm::default();
        for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
            match key.as_ref() {
                "start_city" => form.start = value.into_owned(),
                "end_city" => form.end = value.into_owned(),
                "intermediate_city" => form.intermediates.push(value.into_owned()),
                _ => {}
            }
        }
        form
    }

    fn into_route(self) -> Route {
        Route::from_form(self.start, self.intermediates, self.end)
    }
}

/// Controls of the chart request.
#[derive(Debug, PartialEq)]
struct ChartQuery {
    route: Option<RouteId>,
    days: DayCount,
    parameters: Vec<String>,
}

impl ChartQuery {
    fn parse(query: Option<&str>) -> Result<Self, String> {
        let mut route = None;
        let mut days = DayCount::default();
        let mut parameters = Vec::new();
        let mut selection_sent = false;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "route" => route = value.parse::<RouteId>().ok(),
                "days" => {
                    let n: u32 = value
                        .trim()
                        .parse()
                        .map_err(|_| format!("invalid day count '{value}'"))?;
                    days = DayCount::try_from(n).map_err(|e| e.to_string())?;
                }
                // A bare `parameter=` marks an explicitly empty selection.
                "parameter" => {
                    selection_sent = true;
                    if !value.is_empty() {
                        parameters.push(value.into_owned());
                    }
                }
                _ => {}
            }
        }

        if !selection_sent {
            parameters.push(DEFAULT_PARAMETER.to_string());
        }

        Ok(Self {
            route,
            days,
            parameters,
        })
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /weather — run the submitted route in strict mode.
async fn submit_route(State(state): State<AppState>, body: String) -> Html<String> {
    let route = RouteForm::parse(&body).into_route();
    let id = state.routes.insert(route.clone());
    tracing::info!(route = %id, cities = route.len(), "route submitted");

    match run_strict(state.provider.as_ref(), &route).await {
        Ok(result) => Html(render::result_page(&result, id)),
        Err(err) => {
            tracing::info!(route = %id, error = %err, "route failed");
            Html(render::error_page(&err.user_message()))
        }
    }
}

/// GET /chart — lenient re-run of a stored route for the chart controls.
async fn chart_data(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Chart>, (StatusCode, String)> {
    let query =
        ChartQuery::parse(query.as_deref()).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let Some(route) = query.route.and_then(|id| state.routes.get(&id)) else {
        tracing::info!("chart requested for unknown route");
        return Ok(Json(Chart::empty()));
    };

    let result = run_lenient(
        state.provider.as_ref(),
        &route,
        query.days,
        &query.parameters,
    )
    .await;
    if !result.skipped().is_empty() {
        tracing::info!(skipped = result.skipped().len(), "chart built without some cities");
    }

    Ok(Json(build_chart(&result, &query.parameters)))
}

async fn chart_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        CHART_JS,
    )
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
