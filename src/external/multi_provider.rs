use async_trait::async_trait;
use tracing::{info, warn};

use crate::external::quote_provider::{
    QuoteObservation, QuoteProvider, QuoteProviderError, SeriesKind,
};

/// MultiQuoteProvider tries the primary provider first and falls back on any
/// failure.
///
/// Wiring puts AwesomeAPI first (USD/BRL only, keyless) with HG Brasil
/// behind it; Ibovespa requests pass straight through to the fallback via
/// `Unsupported`.
pub struct MultiQuoteProvider {
    primary: Box<dyn QuoteProvider>,
    fallback: Box<dyn QuoteProvider>,
}

impl MultiQuoteProvider {
    pub fn new(primary: Box<dyn QuoteProvider>, fallback: Box<dyn QuoteProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl QuoteProvider for MultiQuoteProvider {
    async fn fetch_quote(
        &self,
        series: SeriesKind,
    ) -> Result<QuoteObservation, QuoteProviderError> {
        match self.primary.fetch_quote(series).await {
            Ok(observation) => {
                info!("✓ Fetched {} from primary provider", series);
                return Ok(observation);
            }
            Err(QuoteProviderError::Unsupported) => {
                info!("Primary provider does not cover {}, trying fallback", series);
            }
            Err(QuoteProviderError::RateLimited) => {
                info!("⚠️ Primary provider rate limited for {}, trying fallback", series);
            }
            Err(e) => {
                warn!("Primary provider error for {}: {}", series, e);
            }
        }

        match self.fallback.fetch_quote(series).await {
            Ok(observation) => {
                info!("✓ Fetched {} from fallback provider", series);
                Ok(observation)
            }
            Err(e) => {
                warn!("Fallback provider failed for {}: {}", series, e);
                Err(e)
            }
        }
    }
}
