use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default lifetime of a cached provider response.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Provider endpoint a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    /// Path segment appended to the provider's base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Current => f.write_str("current weather"),
            Endpoint::Forecast => f.write_str("forecast"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    location: String,
    endpoint: Endpoint,
    bucket: u64,
}

#[derive(Debug)]
struct Entry<V> {
    stored_at: SystemTime,
    value: V,
}

/// Time-boxed memo of provider responses.
///
/// Keys combine the location, the endpoint and the TTL-sized time bucket the entry was stored
/// in, so a lookup in a later bucket never sees an older response. Entries also carry their
/// insertion time and are checked against the TTL explicitly.
#[derive(Debug)]
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: HashMap<CacheKey, Entry<V>>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        ResponseCache {
            // A zero TTL would make every bucket computation divide by zero.
            ttl: ttl.max(Duration::from_secs(1)),
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn key(&self, location: &str, endpoint: Endpoint, now: SystemTime) -> CacheKey {
        let secs = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        CacheKey {
            location: location.to_string(),
            endpoint,
            bucket: secs / self.ttl.as_secs(),
        }
    }

    fn is_fresh(&self, entry: &Entry<V>, now: SystemTime) -> bool {
        now.duration_since(entry.stored_at)
            .map(|age| age < self.ttl)
            // Clock went backwards; keep the entry rather than refetch.
            .unwrap_or(true)
    }

    /// Return the cached value for `location`/`endpoint` if it is still fresh at `now`.
    pub fn get(&self, location: &str, endpoint: Endpoint, now: SystemTime) -> Option<V> {
        let entry = self.entries.get(&self.key(location, endpoint, now))?;
        self.is_fresh(entry, now).then(|| entry.value.clone())
    }

    /// Store `value`, dropping anything that has expired by `now`.
    pub fn insert(&mut self, location: &str, endpoint: Endpoint, value: V, now: SystemTime) {
        self.purge_expired(now);
        let key = self.key(location, endpoint, now);
        self.entries.insert(
            key,
            Entry {
                stored_at: now,
                value,
            },
        );
    }

    pub fn purge_expired(&mut self, now: SystemTime) {
        let current_bucket = self.key("", Endpoint::Current, now).bucket;
        let ttl = self.ttl;
        self.entries.retain(|key, entry| {
            key.bucket == current_bucket
                && now
                    .duration_since(entry.stored_at)
                    .map(|age| age < ttl)
                    .unwrap_or(true)
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn hit_within_bucket() {
        let mut cache = ResponseCache::new(Duration::from_secs(3600));
        cache.insert("Jalisco", Endpoint::Current, 1, at(7200));
        assert_eq!(cache.get("Jalisco", Endpoint::Current, at(7200)), Some(1));
        assert_eq!(cache.get("Jalisco", Endpoint::Current, at(10799)), Some(1));
    }

    #[test]
    fn miss_after_bucket_rolls_over() {
        let mut cache = ResponseCache::new(Duration::from_secs(3600));
        cache.insert("Jalisco", Endpoint::Current, 1, at(10000));
        // Same hour bucket ends at 10800.
        assert_eq!(cache.get("Jalisco", Endpoint::Current, at(10799)), Some(1));
        assert_eq!(cache.get("Jalisco", Endpoint::Current, at(10800)), None);
    }

    #[test]
    fn keys_are_separate() {
        let mut cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("Jalisco", Endpoint::Current, 1, at(0));
        cache.insert("Jalisco", Endpoint::Forecast, 2, at(0));
        cache.insert("Sonora", Endpoint::Current, 3, at(0));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("Jalisco", Endpoint::Current, at(1)), Some(1));
        assert_eq!(cache.get("Jalisco", Endpoint::Forecast, at(1)), Some(2));
        assert_eq!(cache.get("Sonora", Endpoint::Current, at(1)), Some(3));
        assert_eq!(cache.get("Sonora", Endpoint::Forecast, at(1)), None);
    }

    #[test]
    fn insert_purges_expired() {
        let mut cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("Jalisco", Endpoint::Current, 1, at(0));
        cache.insert("Sonora", Endpoint::Current, 2, at(120));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("Sonora", Endpoint::Current, at(150)), Some(2));
    }

    #[test]
    fn overwrite_replaces_value() {
        let mut cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("Jalisco", Endpoint::Forecast, 1, at(0));
        cache.insert("Jalisco", Endpoint::Forecast, 2, at(10));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("Jalisco", Endpoint::Forecast, at(20)), Some(2));
    }

    #[test]
    fn zero_ttl_is_clamped() {
        let cache: ResponseCache<u8> = ResponseCache::new(Duration::ZERO);
        assert_eq!(cache.ttl(), Duration::from_secs(1));
        assert!(cache.is_empty());
    }
}
