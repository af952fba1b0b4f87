use std::time::{Duration, SystemTime};

use chrono::DateTime;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{Endpoint, ResponseCache};
use crate::config::Config;
use crate::data::{CurrentConditions, ForecastSample};
use crate::error::FetchError;
use crate::location::Location;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest provider error body kept in a notice.
const MAX_ERROR_BODY: usize = 200;

/// OpenWeather client with a time-boxed response cache.
///
/// Requests are never retried: a failed call is reported and the next refresh tries again.
pub struct WeatherClient {
    http: reqwest::Client,
    config: Config,
    cache: Mutex<ResponseCache<Value>>,
}

impl WeatherClient {
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(WeatherClient {
            http,
            cache: Mutex::new(ResponseCache::new(config.cache_ttl)),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drop every cached response so the next fetch goes to the provider.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    /// Fetch `endpoint` for `location` and decode it with `parse`, from cache when fresh.
    ///
    /// A payload is cached only once it has decoded, so a malformed response is requested
    /// again on the next call like any other failure.
    pub async fn fetch<T>(
        &self,
        location: &Location,
        endpoint: Endpoint,
        parse: impl Fn(&Value) -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let cached = self
            .cache
            .lock()
            .get(location.name, endpoint, SystemTime::now());
        if let Some(payload) = cached {
            tracing::debug!(location = location.name, endpoint = endpoint.path(), "cache hit");
            return parse(&payload);
        }

        let payload = self
            .download(location.latitude, location.longitude, endpoint)
            .await?;
        let parsed = parse(&payload)?;
        self.cache
            .lock()
            .insert(location.name, endpoint, payload, SystemTime::now());
        Ok(parsed)
    }

    /// Download current conditions for `location`.
    pub async fn current(&self, location: &Location) -> Result<CurrentConditions, FetchError> {
        self.fetch(location, Endpoint::Current, parse_current).await
    }

    /// Download the 5-day / 3-hour forecast for `location`.
    pub async fn forecast(&self, location: &Location) -> Result<Vec<ForecastSample>, FetchError> {
        self.fetch(location, Endpoint::Forecast, parse_forecast).await
    }

    async fn download(
        &self,
        latitude: f64,
        longitude: f64,
        endpoint: Endpoint,
    ) -> Result<Value, FetchError> {
        #[derive(Serialize)]
        struct Query<'a> {
            lat: f64,
            lon: f64,
            appid: &'a str,
            units: &'a str,
            lang: &'a str,
        }

        let url = format!("{}/{}", self.config.base_url, endpoint.path());
        tracing::debug!(latitude, longitude, endpoint = endpoint.path(), "requesting");

        let response = self
            .http
            .get(&url)
            .query(&Query {
                lat: latitude,
                lon: longitude,
                appid: &self.config.api_key,
                units: "metric",
                lang: &self.config.lang,
            })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status,
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Decode a current-weather payload.
///
/// Every section is optional: a payload without `wind` yields no wind speed rather than an error.
pub fn parse_current(payload: &Value) -> Result<CurrentConditions, FetchError> {
    #[derive(Debug, Deserialize)]
    struct Response {
        main: Option<Main>,
        wind: Option<Wind>,
        weather: Option<Vec<Description>>,
    }

    #[derive(Debug, Deserialize)]
    struct Main {
        temp: Option<f64>,
        humidity: Option<f64>,
        pressure: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    struct Wind {
        speed: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    struct Description {
        description: Option<String>,
        icon: Option<String>,
    }

    let data = Response::deserialize(payload)?;
    let main = data.main;
    let description = data.weather.and_then(|w| w.into_iter().next());

    Ok(CurrentConditions {
        temp: main.as_ref().and_then(|m| m.temp),
        humidity: main.as_ref().and_then(|m| m.humidity),
        pressure: main.as_ref().and_then(|m| m.pressure),
        wind_speed: data.wind.and_then(|w| w.speed),
        description: description.as_ref().and_then(|d| d.description.clone()),
        icon: description.and_then(|d| d.icon),
    })
}

/// Decode a forecast payload into samples, in payload order.
///
/// A payload without `list` decodes as no samples; a window without `rain` or `rain.3h` has
/// zero precipitation.
pub fn parse_forecast(payload: &Value) -> Result<Vec<ForecastSample>, FetchError> {
    #[derive(Debug, Deserialize)]
    struct Response {
        list: Option<Vec<Period>>,
    }

    #[derive(Debug, Deserialize)]
    struct Period {
        dt: i64,
        main: PeriodMain,
        rain: Option<Rain>,
    }

    #[derive(Debug, Deserialize)]
    struct PeriodMain {
        temp: f64,
    }

    #[derive(Debug, Deserialize)]
    struct Rain {
        #[serde(rename = "3h")]
        three_hours: Option<f64>,
    }

    let data = Response::deserialize(payload)?;

    data.list
        .unwrap_or_default()
        .into_iter()
        .map(|period| -> Result<ForecastSample, FetchError> {
            let time = DateTime::from_timestamp(period.dt, 0).ok_or_else(|| {
                <serde_json::Error as serde::de::Error>::custom(format!(
                    "timestamp out of range: {}",
                    period.dt
                ))
            })?;
            Ok(ForecastSample {
                time,
                temp: period.main.temp,
                precip: period.rain.and_then(|r| r.three_hours).unwrap_or(0.0),
            })
        })
        .collect()
}
