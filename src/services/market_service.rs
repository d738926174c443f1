use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::external::quote_provider::{QuoteObservation, QuoteProvider, SeriesKind};
use crate::models::{
    MarketHistoryDocument, MarketOverview, RefreshCounters, RefreshSummary, SeriesPoint,
    SeriesSnapshot,
};
use crate::services::clock::{self, Clock};
use crate::services::quote_cache::QuoteCache;
use crate::services::reconciler;
use crate::store::JsonStore;

/// Store key for the rolling history document.
pub const MARKET_HISTORY_KEY: &str = "market_history.json";

const TRACKED_SERIES: [SeriesKind; 2] = [SeriesKind::Usd, SeriesKind::Ibovespa];

// Served when a series has no stored history and the fetch failed.
const FALLBACK_USD_CURRENT: f64 = 5.42;
const FALLBACK_USD_CHANGE: f64 = 0.15;
const FALLBACK_USD_HISTORY: [f64; 7] = [5.38, 5.39, 5.40, 5.41, 5.42, 5.43, 5.42];

const FALLBACK_IBOV_CURRENT: f64 = 128_500.0;
const FALLBACK_IBOV_CHANGE: f64 = -0.45;
const FALLBACK_IBOV_HISTORY: [f64; 7] = [
    127_500.0, 128_000.0, 128_200.0, 128_800.0, 129_000.0, 128_700.0, 128_500.0,
];

/// What happened to one series during a refresh cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesOutcome {
    pub observation: Option<QuoteObservation>,
    pub changed: bool,
    pub fetch_failed: bool,
}

/// Result of one refresh cycle: the reconciled document plus per-series
/// outcomes. `persisted` is true only when a write happened and succeeded.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub document: MarketHistoryDocument,
    pub usd: SeriesOutcome,
    pub ibovespa: SeriesOutcome,
    pub persisted: bool,
}

impl RefreshOutcome {
    pub fn has_fetch_error(&self) -> bool {
        self.usd.fetch_failed || self.ibovespa.fetch_failed
    }

    pub fn summary(&self) -> RefreshSummary {
        RefreshSummary {
            success: true,
            message: "market history updated".to_string(),
            data: RefreshCounters {
                usd: self.usd.observation.map(|o| o.value).unwrap_or(0.0),
                ibovespa: self.ibovespa.observation.map(|o| o.value).unwrap_or(0.0),
                usd_history_length: self.document.usd.len(),
                ibov_history_length: self.document.ibovespa.len(),
                persisted: self.persisted,
            },
        }
    }
}

/// One full refresh cycle: read the document, fetch both series
/// concurrently, reconcile each one independently, and write the document
/// back once when anything changed.
///
/// Nothing here is fatal. A failed fetch or non-positive value skips that
/// series for the cycle; a failed write is logged and the reconciled
/// document is still returned.
pub async fn run_refresh_cycle(
    store: &JsonStore,
    provider: &dyn QuoteProvider,
    cache: &QuoteCache,
    clock: &dyn Clock,
    use_cache: bool,
) -> RefreshOutcome {
    let document: MarketHistoryDocument = store
        .read(MARKET_HISTORY_KEY, MarketHistoryDocument::default())
        .await;

    let today = clock::today_key(clock);

    let fetches: Vec<_> = TRACKED_SERIES
        .iter()
        .map(|&series| fetch_series(provider, cache, series, use_cache))
        .collect();

    let mut usd = SeriesOutcome::default();
    let mut ibovespa = SeriesOutcome::default();
    for (series, observation, fetch_failed) in join_all(fetches).await {
        let outcome = match series {
            SeriesKind::Usd => &mut usd,
            SeriesKind::Ibovespa => &mut ibovespa,
        };
        outcome.observation = observation;
        outcome.fetch_failed = fetch_failed;
    }

    let mut updated = document;
    apply_observation(&mut updated.usd, &mut usd, SeriesKind::Usd, &today);
    apply_observation(&mut updated.ibovespa, &mut ibovespa, SeriesKind::Ibovespa, &today);

    let mut persisted = false;
    if usd.changed || ibovespa.changed {
        updated.last_updated = clock::iso_timestamp(clock);
        match store.write(MARKET_HISTORY_KEY, &updated).await {
            Ok(()) => {
                persisted = true;
                info!(
                    "💾 Market history persisted for {} (usd: {} points, ibovespa: {} points)",
                    today,
                    updated.usd.len(),
                    updated.ibovespa.len()
                );
            }
            Err(e) => {
                error!(
                    "Failed to persist market history: {}. Serving in-memory data.",
                    e
                );
            }
        }
    } else {
        debug!("No series changed for {}; skipping write", today);
    }

    RefreshOutcome {
        document: updated,
        usd,
        ibovespa,
        persisted,
    }
}

/// Dashboard projection. Runs a cycle through the quote cache, then shapes
/// each series for the chart, falling back to canned data when a series has
/// neither stored history nor a fresh quote.
pub async fn market_overview(
    store: &JsonStore,
    provider: &dyn QuoteProvider,
    cache: &QuoteCache,
    clock: &dyn Clock,
) -> MarketOverview {
    let outcome = run_refresh_cycle(store, provider, cache, clock, true).await;

    MarketOverview {
        usd: series_snapshot(
            &outcome.document.usd,
            outcome.usd.observation,
            SeriesKind::Usd,
            clock,
        ),
        ibovespa: series_snapshot(
            &outcome.document.ibovespa,
            outcome.ibovespa.observation,
            SeriesKind::Ibovespa,
            clock,
        ),
        has_error: outcome.has_fetch_error(),
        last_updated: outcome.document.last_updated.clone(),
    }
}

async fn fetch_series(
    provider: &dyn QuoteProvider,
    cache: &QuoteCache,
    series: SeriesKind,
    use_cache: bool,
) -> (SeriesKind, Option<QuoteObservation>, bool) {
    if use_cache {
        if let Some(observation) = cache.get_fresh(series) {
            debug!("Using cached {} quote", series);
            return (series, Some(observation), false);
        }
    }

    match provider.fetch_quote(series).await {
        Ok(observation) => {
            cache.put(series, observation);
            (series, Some(observation), false)
        }
        Err(e) => {
            warn!("Failed to fetch {} quote: {}", series, e);
            (series, None, true)
        }
    }
}

fn apply_observation(
    history: &mut Vec<SeriesPoint>,
    outcome: &mut SeriesOutcome,
    series: SeriesKind,
    today: &str,
) {
    let observation = match outcome.observation {
        Some(observation) => observation,
        None => return,
    };

    // A zero or negative level means the upstream had no real quote.
    if observation.value <= 0.0 {
        debug!("Skipping non-positive {} value: {}", series, observation.value);
        return;
    }

    let merged = reconciler::reconcile(history, today, observation.value);
    if reconciler::should_persist(history, &merged) {
        *history = merged;
        outcome.changed = true;
    }
}

fn series_snapshot(
    history: &[SeriesPoint],
    observation: Option<QuoteObservation>,
    series: SeriesKind,
    clock: &dyn Clock,
) -> SeriesSnapshot {
    if history.is_empty() {
        return fallback_snapshot(series, clock);
    }

    let last = history.last().map(|point| point.value).unwrap_or(0.0);
    SeriesSnapshot {
        current: observation
            .map(|o| o.value)
            .filter(|v| *v > 0.0)
            .unwrap_or(last),
        change: observation.map(|o| o.change_pct).unwrap_or(0.0),
        history: reconciler::values(history),
        dates: reconciler::dates(history),
    }
}

fn fallback_snapshot(series: SeriesKind, clock: &dyn Clock) -> SeriesSnapshot {
    let dates = fallback_dates(clock);
    match series {
        SeriesKind::Usd => SeriesSnapshot {
            current: FALLBACK_USD_CURRENT,
            change: FALLBACK_USD_CHANGE,
            history: FALLBACK_USD_HISTORY.to_vec(),
            dates,
        },
        SeriesKind::Ibovespa => SeriesSnapshot {
            current: FALLBACK_IBOV_CURRENT,
            change: FALLBACK_IBOV_CHANGE,
            history: FALLBACK_IBOV_HISTORY.to_vec(),
            dates,
        },
    }
}

// The trailing seven São Paulo day labels, ending today.
fn fallback_dates(clock: &dyn Clock) -> Vec<String> {
    let today = clock
        .now()
        .with_timezone(&clock::MARKET_TIMEZONE)
        .date_naive();
    let window = reconciler::HISTORY_WINDOW as i64;
    (0..window)
        .map(|i| {
            let day = today - chrono::Duration::days(window - 1 - i);
            day.format("%d/%m").to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::quote_provider::QuoteProviderError;
    use crate::services::clock::FixedClock;
    use crate::store::{BlobStore, MemoryStore, StoreError};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct ScriptedProvider {
        usd: Option<QuoteObservation>,
        ibovespa: Option<QuoteObservation>,
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        async fn fetch_quote(
            &self,
            series: SeriesKind,
        ) -> Result<QuoteObservation, QuoteProviderError> {
            let quote = match series {
                SeriesKind::Usd => self.usd,
                SeriesKind::Ibovespa => self.ibovespa,
            };
            quote.ok_or_else(|| QuoteProviderError::Network("scripted failure".into()))
        }
    }

    struct CountingProvider {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl QuoteProvider for CountingProvider {
        async fn fetch_quote(
            &self,
            _series: SeriesKind,
        ) -> Result<QuoteObservation, QuoteProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(QuoteObservation { value: 5.0, change_pct: 0.0 })
        }
    }

    struct FailingStore;

    #[async_trait]
    impl BlobStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn put(&self, _key: &str, _payload: String) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey("simulated write failure".into()))
        }
    }

    fn store() -> JsonStore {
        JsonStore::new(Arc::new(MemoryStore::new()))
    }

    fn obs(value: f64, change_pct: f64) -> Option<QuoteObservation> {
        Some(QuoteObservation { value, change_pct })
    }

    fn clock_at(hour: u32) -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 5, 10, hour, 0, 0).unwrap())
    }

    fn both_series_provider() -> ScriptedProvider {
        ScriptedProvider {
            usd: obs(5.42, 0.15),
            ibovespa: obs(128_500.0, -0.45),
        }
    }

    #[tokio::test]
    async fn first_cycle_appends_and_persists() {
        let store = store();
        let provider = both_series_provider();
        let cache = QuoteCache::new(0);
        let clock = clock_at(12);

        let outcome = run_refresh_cycle(&store, &provider, &cache, &clock, false).await;

        assert_eq!(
            outcome.document.usd,
            vec![SeriesPoint { date: "10/05".into(), value: 5.42 }]
        );
        assert_eq!(
            outcome.document.ibovespa,
            vec![SeriesPoint { date: "10/05".into(), value: 128_500.0 }]
        );
        assert_eq!(outcome.document.last_updated, "2025-05-10T12:00:00.000Z");
        assert!(outcome.persisted);
        assert!(!outcome.has_fetch_error());

        // The written document reads back identically.
        let stored: MarketHistoryDocument = store
            .read(MARKET_HISTORY_KEY, MarketHistoryDocument::default())
            .await;
        assert_eq!(stored, outcome.document);
    }

    #[tokio::test]
    async fn identical_same_day_cycle_skips_write() {
        let store = store();
        let provider = both_series_provider();
        let cache = QuoteCache::new(0);

        let first = run_refresh_cycle(&store, &provider, &cache, &clock_at(12), false).await;
        assert!(first.persisted);

        let second = run_refresh_cycle(&store, &provider, &cache, &clock_at(15), false).await;
        assert!(!second.usd.changed);
        assert!(!second.ibovespa.changed);
        assert!(!second.persisted);

        // lastUpdated still carries the first cycle's stamp.
        let stored: MarketHistoryDocument = store
            .read(MARKET_HISTORY_KEY, MarketHistoryDocument::default())
            .await;
        assert_eq!(stored.last_updated, "2025-05-10T12:00:00.000Z");
    }

    #[tokio::test]
    async fn same_day_new_value_overwrites_without_growing() {
        let store = store();
        let cache = QuoteCache::new(0);

        let morning = ScriptedProvider { usd: obs(5.50, 0.0), ibovespa: None };
        run_refresh_cycle(&store, &morning, &cache, &clock_at(12), false).await;

        let afternoon = ScriptedProvider { usd: obs(5.55, 0.0), ibovespa: None };
        let outcome = run_refresh_cycle(&store, &afternoon, &cache, &clock_at(16), false).await;

        assert!(outcome.usd.changed);
        assert_eq!(
            outcome.document.usd,
            vec![SeriesPoint { date: "10/05".into(), value: 5.55 }]
        );
        assert_eq!(outcome.document.last_updated, "2025-05-10T16:00:00.000Z");
    }

    #[tokio::test]
    async fn failing_series_does_not_block_the_other() {
        let store = store();
        let provider = ScriptedProvider { usd: obs(5.42, 0.15), ibovespa: None };
        let cache = QuoteCache::new(0);

        let outcome = run_refresh_cycle(&store, &provider, &cache, &clock_at(12), false).await;

        assert!(outcome.usd.changed);
        assert!(!outcome.ibovespa.changed);
        assert!(outcome.ibovespa.fetch_failed);
        assert!(outcome.has_fetch_error());
        assert!(outcome.persisted);
        assert!(outcome.document.ibovespa.is_empty());
    }

    #[tokio::test]
    async fn non_positive_value_skips_series() {
        let store = store();
        let provider = ScriptedProvider {
            usd: obs(0.0, 0.0),
            ibovespa: obs(128_500.0, -0.45),
        };
        let cache = QuoteCache::new(0);

        let outcome = run_refresh_cycle(&store, &provider, &cache, &clock_at(12), false).await;

        assert!(!outcome.usd.changed);
        assert!(!outcome.usd.fetch_failed);
        assert!(outcome.document.usd.is_empty());
        assert!(outcome.ibovespa.changed);
    }

    #[tokio::test]
    async fn corrupt_document_is_coerced_before_reconciling() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .put(MARKET_HISTORY_KEY, "{\"usd\": \"garbage\"}".to_string())
            .await
            .unwrap();
        let store = JsonStore::new(backend);
        let provider = both_series_provider();
        let cache = QuoteCache::new(0);

        let outcome = run_refresh_cycle(&store, &provider, &cache, &clock_at(12), false).await;

        assert_eq!(outcome.document.usd.len(), 1);
        assert_eq!(outcome.document.usd[0].value, 5.42);
    }

    #[tokio::test]
    async fn write_failure_degrades_to_in_memory_document() {
        let store = JsonStore::new(Arc::new(FailingStore));
        let provider = both_series_provider();
        let cache = QuoteCache::new(0);

        let outcome = run_refresh_cycle(&store, &provider, &cache, &clock_at(12), false).await;

        assert!(!outcome.persisted);
        assert!(outcome.usd.changed);
        assert_eq!(outcome.document.usd.len(), 1);
    }

    #[tokio::test]
    async fn cache_serves_overview_and_is_bypassed_on_refresh() {
        let store = store();
        let calls = Arc::new(AtomicU32::new(0));
        let provider = CountingProvider { calls: calls.clone() };
        let cache = QuoteCache::new(60);

        run_refresh_cycle(&store, &provider, &cache, &clock_at(12), true).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Within TTL the cached quotes are reused.
        run_refresh_cycle(&store, &provider, &cache, &clock_at(12), true).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // A forced refresh goes back upstream.
        run_refresh_cycle(&store, &provider, &cache, &clock_at(12), false).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn overview_serves_fallback_when_nothing_is_available() {
        let store = store();
        let provider = ScriptedProvider { usd: None, ibovespa: None };
        let cache = QuoteCache::new(0);
        let clock = clock_at(12);

        let overview = market_overview(&store, &provider, &cache, &clock).await;

        assert!(overview.has_error);
        assert_eq!(overview.usd.current, 5.42);
        assert_eq!(overview.usd.history, FALLBACK_USD_HISTORY.to_vec());
        assert_eq!(overview.ibovespa.current, 128_500.0);
        assert_eq!(overview.usd.dates.len(), 7);
        assert_eq!(overview.usd.dates.last().unwrap(), "10/05");
        assert_eq!(overview.usd.dates.first().unwrap(), "04/05");
    }

    #[tokio::test]
    async fn overview_projects_reconciled_history() {
        let store = store();
        let provider = both_series_provider();
        let cache = QuoteCache::new(0);
        let clock = clock_at(12);

        let overview = market_overview(&store, &provider, &cache, &clock).await;

        assert!(!overview.has_error);
        assert_eq!(overview.usd.current, 5.42);
        assert_eq!(overview.usd.change, 0.15);
        assert_eq!(overview.usd.history, vec![5.42]);
        assert_eq!(overview.usd.dates, vec!["10/05".to_string()]);
        assert_eq!(overview.last_updated, "2025-05-10T12:00:00.000Z");
    }

    #[tokio::test]
    async fn summary_reports_values_and_lengths() {
        let store = store();
        let provider = ScriptedProvider { usd: obs(5.42, 0.15), ibovespa: None };
        let cache = QuoteCache::new(0);

        let outcome = run_refresh_cycle(&store, &provider, &cache, &clock_at(12), false).await;
        let summary = outcome.summary();

        assert!(summary.success);
        assert_eq!(summary.data.usd, 5.42);
        assert_eq!(summary.data.ibovespa, 0.0);
        assert_eq!(summary.data.usd_history_length, 1);
        assert_eq!(summary.data.ibov_history_length, 0);
        assert!(summary.data.persisted);
    }
}
