use async_trait::async_trait;
use serde::Deserialize;

use crate::external::quote_provider::{
    QuoteObservation, QuoteProvider, QuoteProviderError, SeriesKind,
};

const FINANCE_URL: &str = "https://api.hgbrasil.com/finance";

/// HG Brasil Finance quotes: the USD/BRL buy rate and the Ibovespa points
/// index, each with a day variation. The free "development" key works for
/// both.
pub struct HgBrasilProvider {
    client: reqwest::Client,
    api_key: String,
}

impl HgBrasilProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HgFinanceResponse {
    results: Option<HgResults>,
}

#[derive(Debug, Deserialize)]
struct HgResults {
    currencies: Option<HgCurrencies>,
    stocks: Option<HgStocks>,
}

#[derive(Debug, Deserialize)]
struct HgCurrencies {
    #[serde(rename = "USD")]
    usd: Option<HgCurrencyQuote>,
}

#[derive(Debug, Deserialize)]
struct HgCurrencyQuote {
    buy: Option<f64>,
    variation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HgStocks {
    #[serde(rename = "IBOVESPA")]
    ibovespa: Option<HgStockQuote>,
}

#[derive(Debug, Deserialize)]
struct HgStockQuote {
    points: Option<f64>,
    variation: Option<f64>,
}

#[async_trait]
impl QuoteProvider for HgBrasilProvider {
    async fn fetch_quote(
        &self,
        series: SeriesKind,
    ) -> Result<QuoteObservation, QuoteProviderError> {
        let resp = self
            .client
            .get(FINANCE_URL)
            .query(&[("format", "json-cors"), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(QuoteProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(QuoteProviderError::BadResponse(format!(
                "API returned status: {}",
                resp.status()
            )));
        }

        let body: HgFinanceResponse = resp
            .json()
            .await
            .map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

        let results = body
            .results
            .ok_or_else(|| QuoteProviderError::BadResponse("missing results in response".into()))?;

        match series {
            SeriesKind::Usd => {
                let quote = results.currencies.and_then(|c| c.usd).ok_or_else(|| {
                    QuoteProviderError::BadResponse("missing USD quote in response".into())
                })?;
                let value = quote.buy.ok_or_else(|| {
                    QuoteProviderError::BadResponse("missing USD buy rate".into())
                })?;
                Ok(QuoteObservation {
                    value,
                    change_pct: quote.variation.unwrap_or(0.0),
                })
            }
            SeriesKind::Ibovespa => {
                let quote = results.stocks.and_then(|s| s.ibovespa).ok_or_else(|| {
                    QuoteProviderError::BadResponse("missing IBOVESPA quote in response".into())
                })?;
                let value = quote.points.ok_or_else(|| {
                    QuoteProviderError::BadResponse("missing IBOVESPA points".into())
                })?;
                Ok(QuoteObservation {
                    value,
                    change_pct: quote.variation.unwrap_or(0.0),
                })
            }
        }
    }
}
