use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use crate::location::{Location, Region};

/// Minimum precipitation per 3-hour window, in mm, for a sample to count as rain.
pub const RAIN_THRESHOLD_MM: f64 = 1.0;

/// One 3-hour forecast window.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temp: f64,
    /// Precipitation over the preceding 3 hours. Absent in the payload means 0.
    pub precip: f64,
}

impl ForecastSample {
    pub fn is_rain(&self) -> bool {
        self.precip >= RAIN_THRESHOLD_MM
    }
}

/// Forecast folded over one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub min_temp: f64,
    pub max_temp: f64,
    pub precip: f64,
    pub has_rain: bool,
}

/// Rain outlook of one location over the forecast horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RainAnalysis {
    pub rain_expected: bool,
    /// Percentage of sample windows that count as rain, rounded to one decimal.
    pub probability: f64,
    pub rainy_days: usize,
    pub next_rain: Option<DateTime<FixedOffset>>,
    pub daily: Vec<DailySummary>,
}

/// Current conditions as reported by the provider. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temp: Option<f64>,
    pub description: Option<String>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub icon: Option<String>,
}

/// Everything the dashboard knows about one location after a refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationResult {
    #[serde(flatten)]
    pub location: Location,
    pub current: CurrentConditions,
    pub rain: RainAnalysis,
}

impl LocationResult {
    pub fn name(&self) -> &'static str {
        self.location.name
    }

    pub fn region(&self) -> Region {
        self.location.region
    }

    pub fn marker_color(&self) -> MarkerColor {
        MarkerColor::for_probability(self.rain.probability)
    }
}

/// Map marker colour, bucketed by rain probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Green,
    LightBlue,
    Orange,
    Red,
}

impl MarkerColor {
    /// Thresholds are strict: exactly 50% is light blue, exactly 10% is red.
    pub fn for_probability(probability: f64) -> Self {
        if probability > 50.0 {
            MarkerColor::Green
        } else if probability > 30.0 {
            MarkerColor::LightBlue
        } else if probability > 10.0 {
            MarkerColor::Orange
        } else {
            MarkerColor::Red
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MarkerColor::Green => "green",
            MarkerColor::LightBlue => "lightblue",
            MarkerColor::Orange => "orange",
            MarkerColor::Red => "red",
        }
    }

    pub fn legend(self) -> &'static str {
        match self {
            MarkerColor::Green => "high (>50%)",
            MarkerColor::LightBlue => "medium (30-50%)",
            MarkerColor::Orange => "low (10-30%)",
            MarkerColor::Red => "no rain expected (<10%)",
        }
    }
}

/// Format an optional temperature value.
pub fn format_temp(temp: Option<f64>) -> String {
    match temp {
        Some(t) => format!("{t:.1}°"),
        None => "-".to_string(),
    }
}

/// Format a precipitation amount, leaving dry periods blank.
pub fn format_precip(precip: f64) -> String {
    if precip == 0.0 {
        String::new()
    } else if precip < 5. {
        format!("{precip:.1}mm")
    } else {
        format!("{precip:.0}mm")
    }
}

/// Format an optional percentage such as humidity.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        // as i64 so 64.0 shows up as 64
        Some(v) if v.fract() == 0.0 => format!("{}%", v as i64),
        Some(v) => format!("{v:.1}%"),
        None => "-".to_string(),
    }
}

/// Format an optional wind speed.
pub fn format_wind(speed: Option<f64>) -> String {
    match speed {
        Some(s) => format!("{s:.1} m/s"),
        None => "-".to_string(),
    }
}

/// Format the next predicted rain, day first.
pub fn format_next_rain(next: Option<DateTime<FixedOffset>>) -> String {
    match next {
        Some(t) => t.format("%d/%m/%Y %H:%M").to_string(),
        None => "not expected".to_string(),
    }
}
