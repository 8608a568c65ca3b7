//! Server-side HTML for the result page, plus the plain-text tables of the
//! `route` command.

use std::fmt::Write;
use weather_core::{Reading, RouteId, RouteResult, chart::CHART_TITLE};

const UNAVAILABLE: &str = "Не доступно";

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head>
<meta charset="utf-8">
<title>Прогноз погоды по маршруту</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; margin-bottom: 1.5rem; }
th, td { border: 1px solid #999; padding: 0.3rem 0.6rem; text-align: right; }
th:first-child, td:first-child { text-align: left; }
.error { color: #a00; }
</style>
</head>
<body>
"#;

const TAIL: &str = "<p><a href=\"/\">Новый маршрут</a></p>\n</body>\n</html>\n";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn reading(r: Reading) -> String {
    match r {
        Reading::Value(v) => v.to_string(),
        Reading::Unavailable => UNAVAILABLE.to_string(),
    }
}

/// Page with the single message of a failed submission.
pub fn error_page(message: &str) -> String {
    format!(
        "{HEAD}<h1>Прогноз погоды</h1>\n<p class=\"error\">{}</p>\n{TAIL}",
        escape_html(message)
    )
}

/// One table per city and the chart bound to `route`.
pub fn result_page(result: &RouteResult, route: RouteId) -> String {
    let mut html = String::from(HEAD);
    html.push_str("<h1>Прогноз погоды</h1>\n");

    for forecast in &result.cities {
        let _ = writeln!(html, "<h2>{}</h2>", escape_html(&forecast.city));
        html.push_str(
            "<table>\n<tr><th>Дата</th><th>Температура, °C</th><th>Влажность, %</th>\
             <th>Скорость ветра, км/ч</th><th>Вероятность осадков, %</th></tr>\n",
        );
        for day in &forecast.days {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&day.date),
                day.temperature,
                escape_html(&reading(day.humidity)),
                day.wind_speed,
                escape_html(&reading(day.rain_probability)),
            );
        }
        html.push_str("</table>\n");
    }

    html.push_str(&chart_block(route));
    html.push_str(TAIL);
    html
}

fn chart_block(route: RouteId) -> String {
    format!(
        r#"<section id="chart" data-route="{route}">
<h2>{CHART_TITLE}</h2>
<div id="days-radio">
<label><input type="radio" name="days" value="3"> 3 дня</label>
<label><input type="radio" name="days" value="5" checked> 5 дней</label>
<label><input type="radio" name="days" value="7"> 7 дней</label>
</div>
<div id="weather-parameters">
<label><input type="checkbox" name="parameter" value="temperature" checked> Температура</label>
<label><input type="checkbox" name="parameter" value="wind_speed"> Скорость ветра</label>
<label><input type="checkbox" name="parameter" value="rain_probability"> Вероятность осадков</label>
</div>
<canvas id="weather-graph"></canvas>
</section>
<script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
<script src="/static/chart.js"></script>
"#
    )
}

/// Plain-text rendering of a strict result, one block per city.
pub fn text_tables(result: &RouteResult) -> String {
    let mut out = String::new();
    for forecast in &result.cities {
        let _ = writeln!(out, "{}", forecast.city);
        let _ = writeln!(
            out,
            "{:<28} {:>12} {:>12} {:>15} {:>20}",
            "Дата", "Температура", "Влажность", "Скорость ветра", "Вероятность осадков"
        );
        for day in &forecast.days {
            let _ = writeln!(
                out,
                "{:<28} {:>12} {:>12} {:>15} {:>20}",
                day.date,
                day.temperature,
                reading(day.humidity),
                day.wind_speed,
                reading(day.rain_probability),
            );
        }
        out.push('\n');
    }
    out
}
