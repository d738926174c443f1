use serde::{Deserialize, Deserializer, Serialize};

// One observed value for a market series, keyed by its São Paulo calendar
// day rendered as DD/MM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

/// Persisted rolling history for both tracked series.
///
/// This is the unit of persistence: read once per refresh cycle and written
/// back whole. Histories are oldest-first and never longer than the rolling
/// window. `last_updated` is an ISO-8601 timestamp, empty until the first
/// successful write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketHistoryDocument {
    #[serde(default, deserialize_with = "lenient_series")]
    pub usd: Vec<SeriesPoint>,
    #[serde(default, deserialize_with = "lenient_series")]
    pub ibovespa: Vec<SeriesPoint>,
    #[serde(default)]
    pub last_updated: String,
}

/// Coerces a malformed history to an empty sequence instead of failing the
/// whole document read. Entries missing `date` or `value` are dropped.
fn lenient_series<'de, D>(deserializer: D) -> Result<Vec<SeriesPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_series(raw))
}

fn coerce_series(raw: serde_json::Value) -> Vec<SeriesPoint> {
    match raw {
        serde_json::Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| {
                let date = entry.get("date")?.as_str()?.to_string();
                let value = entry.get("value")?.as_f64()?;
                Some(SeriesPoint { date, value })
            })
            .collect(),
        _ => Vec::new(),
    }
}

// ==============================================================================
// Presentation Types
// ==============================================================================

/// Dashboard shape for one series: latest quote plus the parallel
/// value/date-label sequences the chart consumes.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSnapshot {
    pub current: f64,
    pub change: f64,
    pub history: Vec<f64>,
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    pub usd: SeriesSnapshot,
    pub ibovespa: SeriesSnapshot,
    pub has_error: bool,
    pub last_updated: String,
}

/// Body returned by the refresh trigger endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub success: bool,
    pub message: String,
    pub data: RefreshCounters,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshCounters {
    pub usd: f64,
    pub ibovespa: f64,
    pub usd_history_length: usize,
    pub ibov_history_length: usize,
    pub persisted: bool,
}
