use std::time::Duration;

use anyhow::{anyhow, bail};
use chrono_tz::Tz;

use crate::cache::DEFAULT_TTL;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_LANG: &str = "es";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Mexico_City;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// Provider base URL without trailing slash, e.g. `https://api.openweathermap.org/data/2.5`.
    pub base_url: String,
    /// Language of the provider's weather descriptions.
    pub lang: String,
    /// Timezone that defines calendar days and displayed times.
    pub timezone: Tz,
    /// Maximum number of locations fetched at the same time.
    pub concurrency: usize,
    pub cache_ttl: Duration,
}

impl Config {
    /// Build a config with defaults for everything except the credential.
    ///
    /// Fails if the API key is missing or blank; there is no fallback key.
    pub fn new(api_key: Option<String>) -> anyhow::Result<Self> {
        let api_key = match api_key.map(|k| k.trim().to_string()) {
            Some(k) if !k.is_empty() => k,
            _ => bail!("missing OpenWeather API key: pass --api-key or set OPENWEATHER_API_KEY"),
        };
        Ok(Config {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            timezone: DEFAULT_TIMEZONE,
            concurrency: DEFAULT_CONCURRENCY,
            cache_ttl: DEFAULT_TTL,
        })
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn lang(mut self, lang: &str) -> Self {
        self.lang = lang.to_string();
        self
    }

    pub fn timezone(mut self, name: &str) -> anyhow::Result<Self> {
        self.timezone = name
            .parse::<Tz>()
            .map_err(|e| anyhow!("unknown timezone '{name}': {e}"))?;
        Ok(self)
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}
