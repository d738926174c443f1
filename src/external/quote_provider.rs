use async_trait::async_trait;
use thiserror::Error;

/// The two market series the dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Usd,
    Ibovespa,
}

impl SeriesKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKind::Usd => "USD/BRL",
            SeriesKind::Ibovespa => "IBOVESPA",
        }
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A freshly fetched quote: the current level of the series and its day
/// percent change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteObservation {
    pub value: f64,
    pub change_pct: f64,
}

#[derive(Debug, Error)]
pub enum QuoteProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("series not supported by this provider")]
    Unsupported,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(
        &self,
        series: SeriesKind,
    ) -> Result<QuoteObservation, QuoteProviderError>;
}
