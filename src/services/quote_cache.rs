use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::external::quote_provider::{QuoteObservation, SeriesKind};

#[derive(Debug, Clone)]
struct CachedQuote {
    observation: QuoteObservation,
    fetched_at: DateTime<Utc>,
}

/// Thread-safe per-series quote cache.
///
/// The dashboard overview reads through this so page polling does not hit
/// the upstream APIs more than once per TTL. Refresh cycles bypass it and
/// repopulate it with whatever they fetched.
#[derive(Clone)]
pub struct QuoteCache {
    cache: Arc<DashMap<SeriesKind, CachedQuote>>,
    ttl_secs: i64,
}

impl QuoteCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            ttl_secs: ttl_secs as i64,
        }
    }

    /// Returns the cached observation if it is still within TTL.
    pub fn get_fresh(&self, series: SeriesKind) -> Option<QuoteObservation> {
        if let Some(entry) = self.cache.get(&series) {
            let cached = entry.value().clone();
            let expiry = cached.fetched_at + Duration::seconds(self.ttl_secs);

            if Utc::now() < expiry {
                return Some(cached.observation);
            }
            drop(entry); // Release the read lock before removing
            self.cache.remove(&series);
        }
        None
    }

    pub fn put(&self, series: SeriesKind, observation: QuoteObservation) {
        self.cache.insert(
            series,
            CachedQuote {
                observation,
                fetched_at: Utc::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(value: f64) -> QuoteObservation {
        QuoteObservation {
            value,
            change_pct: 0.0,
        }
    }

    #[test]
    fn returns_observation_within_ttl() {
        let cache = QuoteCache::new(60);
        cache.put(SeriesKind::Usd, obs(5.42));
        assert_eq!(cache.get_fresh(SeriesKind::Usd).unwrap().value, 5.42);
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let cache = QuoteCache::new(0);
        cache.put(SeriesKind::Ibovespa, obs(128500.0));
        assert!(cache.get_fresh(SeriesKind::Ibovespa).is_none());
    }

    #[test]
    fn series_are_cached_independently() {
        let cache = QuoteCache::new(60);
        cache.put(SeriesKind::Usd, obs(5.42));
        assert!(cache.get_fresh(SeriesKind::Ibovespa).is_none());
    }
}
