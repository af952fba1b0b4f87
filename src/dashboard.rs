use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::stream::{self, StreamExt};

use crate::analysis::analyze_rain;
use crate::cache::Endpoint;
use crate::data::{CurrentConditions, LocationResult, RainAnalysis};
use crate::error::FetchError;
use crate::fetch::WeatherClient;
use crate::location::{same_name, Location};

/// A failed request, shown to the user next to whatever could still be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub location: &'static str,
    pub endpoint: Endpoint,
    pub message: String,
}

impl Notice {
    fn new(location: &Location, endpoint: Endpoint, error: &FetchError) -> Self {
        tracing::warn!(location = location.name, %endpoint, "{error}");
        Notice {
            location: location.name,
            endpoint,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not get {} for {}: {}",
            self.endpoint, self.location, self.message
        )
    }
}

/// Everything the views render. A refresh builds a new state; it is never patched in place.
#[derive(Debug, Default)]
pub struct AppState {
    /// One entry per requested location, in request order.
    pub results: Vec<LocationResult>,
    pub notices: Vec<Notice>,
    /// End of the last refresh, in the configured timezone.
    pub last_update: Option<DateTime<Tz>>,
}

impl AppState {
    pub fn is_loaded(&self) -> bool {
        self.last_update.is_some()
    }

    /// Look up a result by state name, ignoring case and accents.
    pub fn result(&self, name: &str) -> Option<&LocationResult> {
        self.results.iter().find(|r| same_name(r.name(), name))
    }
}

/// Fetch and analyze every location, at most `concurrency` at a time.
///
/// Failures are isolated per location: the affected fields fall back to their defaults and a
/// notice is recorded, while the other locations are processed normally.
pub async fn refresh(client: &WeatherClient, locations: &[Location]) -> AppState {
    let config = client.config();
    let timezone = config.timezone;

    tracing::info!(
        locations = locations.len(),
        concurrency = config.concurrency,
        "refreshing"
    );

    let loaded: Vec<(LocationResult, Vec<Notice>)> = stream::iter(locations)
        .map(|location| load_location(client, location, timezone))
        .buffered(config.concurrency.max(1))
        .collect()
        .await;

    let mut state = AppState {
        results: Vec::with_capacity(loaded.len()),
        notices: Vec::new(),
        last_update: Some(Utc::now().with_timezone(&timezone)),
    };
    for (result, notices) in loaded {
        state.results.push(result);
        state.notices.extend(notices);
    }
    state
}

async fn load_location(
    client: &WeatherClient,
    location: &Location,
    timezone: Tz,
) -> (LocationResult, Vec<Notice>) {
    let (current, forecast) = futures::join!(client.current(location), client.forecast(location));
    let mut notices = Vec::new();

    let current = match current {
        Ok(current) => current,
        Err(e) => {
            notices.push(Notice::new(location, Endpoint::Current, &e));
            CurrentConditions::default()
        }
    };

    let rain = match forecast {
        Ok(samples) => analyze_rain(&samples, timezone),
        Err(e) => {
            notices.push(Notice::new(location, Endpoint::Forecast, &e));
            RainAnalysis::default()
        }
    };

    tracing::debug!(
        location = location.name,
        probability = rain.probability,
        rainy_days = rain.rainy_days,
        "analyzed"
    );

    (
        LocationResult {
            location: location.clone(),
            current,
            rain,
        },
        notices,
    )
}
