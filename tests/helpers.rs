use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use findash_backend::external::quote_provider::{
    QuoteObservation, QuoteProvider, QuoteProviderError, SeriesKind,
};
use findash_backend::services::clock::FixedClock;
use findash_backend::services::quote_cache::QuoteCache;
use findash_backend::store::{FileStore, JsonStore};

/// File-backed store rooted in a temporary directory. The directory lives
/// as long as this struct does.
pub struct TestStore {
    pub store: JsonStore,
    pub data_dir: PathBuf,
    _tmp: TempDir,
}

pub fn file_store() -> TestStore {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let data_dir = tmp.path().to_path_buf();
    TestStore {
        store: JsonStore::new(Arc::new(FileStore::new(&data_dir))),
        data_dir,
        _tmp: tmp,
    }
}

/// Open a fresh store over the same directory, as a process restart would.
pub fn reopen(test_store: &TestStore) -> JsonStore {
    JsonStore::new(Arc::new(FileStore::new(&test_store.data_dir)))
}

/// Provider scripted per series; `None` simulates an upstream outage.
pub struct ScriptedProvider {
    pub usd: Option<QuoteObservation>,
    pub ibovespa: Option<QuoteObservation>,
}

#[async_trait]
impl QuoteProvider for ScriptedProvider {
    async fn fetch_quote(
        &self,
        series: SeriesKind,
    ) -> Result<QuoteObservation, QuoteProviderError> {
        let scripted = match series {
            SeriesKind::Usd => self.usd,
            SeriesKind::Ibovespa => self.ibovespa,
        };
        scripted.ok_or_else(|| QuoteProviderError::Network("scripted outage".to_string()))
    }
}

pub fn observation(value: f64, change_pct: f64) -> QuoteObservation {
    QuoteObservation { value, change_pct }
}

pub fn quotes(usd: f64, ibovespa: f64) -> ScriptedProvider {
    ScriptedProvider {
        usd: Some(observation(usd, 0.1)),
        ibovespa: Some(observation(ibovespa, -0.2)),
    }
}

pub fn usd_only(value: f64) -> ScriptedProvider {
    ScriptedProvider {
        usd: Some(observation(value, 0.1)),
        ibovespa: None,
    }
}

/// Clock pinned to noon UTC (09:00 in São Paulo) on the given day.
pub fn noon(year: i32, month: u32, day: u32) -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap())
}

/// Cache with a zero TTL, so every cycle reaches the provider.
pub fn cold_cache() -> QuoteCache {
    QuoteCache::new(0)
}
