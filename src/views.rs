//! Text renderings of the dashboard tabs.
//!
//! Every function takes the current [`AppState`] and returns the finished text, so the binary
//! only decides which view to print.

use std::fmt::Write as _;

use itertools::Itertools;
use serde_json::{json, Value};

use crate::data::{
    format_next_rain, format_percent, format_precip, format_temp, format_wind, LocationResult,
    MarkerColor,
};
use crate::dashboard::AppState;
use crate::location::Region;
use crate::stats::{
    coolest, correlation_matrix, describe, hottest, probability_histogram, regional_summary,
    Metric,
};
use crate::table::Table;

/// How many states the hottest/coolest rankings show.
const RANKING_SIZE: usize = 5;

/// Number of bins in the rain probability histogram.
const HISTOGRAM_BINS: usize = 20;

/// Approximate geographic center of Mexico, `[lat, lon]`.
pub const MAP_CENTER: [f64; 2] = [23.6345, -102.5528];

fn format_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

fn format_probability(probability: f64) -> String {
    format!("{probability:.1}%")
}

fn conditions_table(results: &[&LocationResult], with_region: bool) -> Table {
    let mut table = Table::new().text_column(
        "State",
        results.iter().map(|r| r.name().to_string()).collect(),
    );
    if with_region {
        table = table.text_column(
            "Region",
            results.iter().map(|r| r.region().to_string()).collect(),
        );
    }
    table
        .column(
            "Temp",
            results.iter().map(|r| format_temp(r.current.temp)).collect(),
        )
        .text_column(
            "Conditions",
            results
                .iter()
                .map(|r| r.current.description.clone().unwrap_or_else(|| "-".into()))
                .collect(),
        )
        .column(
            "Humidity",
            results
                .iter()
                .map(|r| format_percent(r.current.humidity))
                .collect(),
        )
        .column(
            "Wind",
            results
                .iter()
                .map(|r| format_wind(r.current.wind_speed))
                .collect(),
        )
}

/// Marker table for the rain probability map, with the colour legend.
pub fn map_view(state: &AppState) -> String {
    let results = &state.results;
    let table = Table::new()
        .text_column("State", results.iter().map(|r| r.name().to_string()).collect())
        .text_column(
            "Region",
            results.iter().map(|r| r.region().to_string()).collect(),
        )
        .column(
            "Lat",
            results
                .iter()
                .map(|r| format!("{:.4}", r.location.latitude))
                .collect(),
        )
        .column(
            "Lon",
            results
                .iter()
                .map(|r| format!("{:.4}", r.location.longitude))
                .collect(),
        )
        .column(
            "Rain prob.",
            results
                .iter()
                .map(|r| format_probability(r.rain.probability))
                .collect(),
        )
        .text_column(
            "Marker",
            results
                .iter()
                .map(|r| r.marker_color().name().to_string())
                .collect(),
        );

    let mut out = String::from("Rain probability map\n");
    out.push_str(&table.render());
    out.push('\n');
    for color in [
        MarkerColor::Green,
        MarkerColor::LightBlue,
        MarkerColor::Orange,
        MarkerColor::Red,
    ] {
        let _ = writeln!(out, "{:>9}: {}", color.name(), color.legend());
    }
    out
}

/// The map as a GeoJSON FeatureCollection with one point per location.
pub fn map_geojson(state: &AppState) -> Value {
    let features: Vec<Value> = state
        .results
        .iter()
        .map(|r| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [r.location.longitude, r.location.latitude],
                },
                "properties": {
                    "name": r.name(),
                    "region": r.region(),
                    "probability": r.rain.probability,
                    "rainy_days": r.rain.rainy_days,
                    "next_rain": r.rain.next_rain,
                    "marker_color": r.marker_color(),
                    "temp": r.current.temp,
                    "description": r.current.description,
                    "humidity": r.current.humidity,
                    "wind_speed": r.current.wind_speed,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "center": MAP_CENTER,
        "features": features,
    })
}

/// Current conditions: warmest and coolest states, then every state by name.
pub fn current_view(state: &AppState) -> String {
    let mut out = String::new();

    out.push_str("Warmest states\n");
    out.push_str(&conditions_table(&hottest(&state.results, RANKING_SIZE), false).render());
    out.push_str("\nCoolest states\n");
    out.push_str(&conditions_table(&coolest(&state.results, RANKING_SIZE), false).render());

    let by_name: Vec<&LocationResult> = state
        .results
        .iter()
        .sorted_by(|a, b| a.name().cmp(b.name()))
        .collect();
    out.push_str("\nAll states\n");
    out.push_str(&conditions_table(&by_name, true).render());
    out
}

/// Rain outlook per state, highest probability first.
pub fn forecast_view(state: &AppState) -> String {
    let ranked: Vec<&LocationResult> = state
        .results
        .iter()
        .sorted_by(|a, b| b.rain.probability.total_cmp(&a.rain.probability))
        .collect();

    let table = Table::new()
        .text_column("State", ranked.iter().map(|r| r.name().to_string()).collect())
        .text_column("Region", ranked.iter().map(|r| r.region().to_string()).collect())
        .column(
            "Rain prob.",
            ranked
                .iter()
                .map(|r| format_probability(r.rain.probability))
                .collect(),
        )
        .column(
            "Rainy days",
            ranked.iter().map(|r| r.rain.rainy_days.to_string()).collect(),
        )
        .text_column(
            "Next rain",
            ranked
                .iter()
                .map(|r| format_next_rain(r.rain.next_rain))
                .collect(),
        );

    let mut out = String::from("Rain forecast for the next 5 days\n");
    out.push_str(&table.render());
    out
}

/// Day-by-day forecast of one state.
pub fn daily_view(result: &LocationResult) -> String {
    let daily = &result.rain.daily;
    let mut out = format!("Daily forecast for {}\n", result.name());
    if daily.is_empty() {
        out.push_str("No daily data available\n");
        return out;
    }

    let table = Table::new()
        .text_column(
            "Date",
            daily
                .iter()
                .map(|d| d.date.format("%d/%m/%Y").to_string())
                .collect(),
        )
        .group("Temperature")
        .column("Min", daily.iter().map(|d| format_temp(Some(d.min_temp))).collect())
        .column("Max", daily.iter().map(|d| format_temp(Some(d.max_temp))).collect())
        .group("Rain")
        .column("Precip", daily.iter().map(|d| format_precip(d.precip)).collect())
        .text_column(
            "",
            daily
                .iter()
                .map(|d| if d.has_rain { "yes" } else { "" }.to_string())
                .collect(),
        );
    out.push_str(&table.render());
    out
}

/// Average rain outlook per region.
pub fn regions_view(state: &AppState) -> String {
    let summary = regional_summary(&state.results);
    let table = Table::new()
        .text_column(
            "Region",
            summary.iter().map(|s| s.region.to_string()).collect(),
        )
        .column(
            "Avg rain prob.",
            summary
                .iter()
                .map(|s| format_probability(s.mean_probability))
                .collect(),
        )
        .column(
            "Avg rainy days",
            summary
                .iter()
                .map(|s| format!("{:.1}", s.mean_rainy_days))
                .collect(),
        )
        .column("States", summary.iter().map(|s| s.states.to_string()).collect());

    let mut out = String::from("Regional rain outlook\n");
    out.push_str(&table.render());
    out
}

/// Descriptive statistics, correlation matrix and probability distribution.
pub fn stats_view(state: &AppState) -> String {
    let results = &state.results;
    let mut out = String::new();

    let descriptions: Vec<_> = Metric::DESCRIBED
        .iter()
        .map(|m| (m, describe(results.iter().map(|r| m.value(r)))))
        .collect();
    let rows = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
    let mut table = Table::new().text_column("", rows.iter().map(|s| s.to_string()).collect());
    for (metric, d) in &descriptions {
        let values = vec![
            d.count.to_string(),
            format_opt(d.mean, 2),
            format_opt(d.std, 2),
            format_opt(d.min, 2),
            format_opt(d.q25, 2),
            format_opt(d.median, 2),
            format_opt(d.q75, 2),
            format_opt(d.max, 2),
        ];
        table = table.column(metric.label(), values);
    }
    out.push_str("Descriptive statistics\n");
    out.push_str(&table.render());

    let metrics = Metric::CORRELATED;
    let matrix = correlation_matrix(results, &metrics);
    let mut table = Table::new().text_column(
        "",
        metrics.iter().map(|m| m.label().to_string()).collect(),
    );
    for (j, metric) in metrics.iter().enumerate() {
        table = table.column(
            metric.label(),
            matrix.iter().map(|row| format_opt(row[j], 2)).collect(),
        );
    }
    out.push_str("\nCorrelation matrix\n");
    out.push_str(&table.render());

    let histogram = probability_histogram(results, HISTOGRAM_BINS);
    let occupied: Vec<_> = histogram.iter().filter(|b| b.total() > 0).collect();
    let mut table = Table::new().text_column(
        "Rain prob.",
        occupied
            .iter()
            .map(|b| format!("{:.0}-{:.0}%", b.start, b.end))
            .collect(),
    );
    for region in Region::ALL {
        table = table.column(
            region.name(),
            occupied
                .iter()
                .map(|b| b.counts.get(&region).copied().unwrap_or(0).to_string())
                .collect(),
        );
    }
    out.push_str("\nRain probability distribution\n");
    out.push_str(&table.render());
    out
}

/// One JSON object per location.
pub fn json_lines(state: &AppState) -> serde_json::Result<String> {
    let mut out = String::new();
    for result in &state.results {
        out.push_str(&serde_json::to_string(result)?);
        out.push('\n');
    }
    Ok(out)
}

/// Refresh notices and the time of the last update.
pub fn footer(state: &AppState) -> String {
    let mut out = String::new();
    for notice in &state.notices {
        let _ = writeln!(out, "warning: {notice}");
    }
    let updated = state
        .last_update
        .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let _ = writeln!(out, "Last update: {updated}");
    out
}
