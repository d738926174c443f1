use async_trait::async_trait;
use serde::Deserialize;

use crate::external::quote_provider::{
    QuoteObservation, QuoteProvider, QuoteProviderError, SeriesKind,
};

const LAST_QUOTE_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL";

/// AwesomeAPI currency quotes. Covers the USD/BRL pair only; no API key.
/// Numeric fields arrive as strings.
pub struct AwesomeApiProvider {
    client: reqwest::Client,
}

impl AwesomeApiProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for AwesomeApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct AwesomeApiResponse {
    #[serde(rename = "USDBRL")]
    usd_brl: Option<AwesomeApiQuote>,
}

#[derive(Debug, Deserialize)]
struct AwesomeApiQuote {
    bid: String,
    #[serde(rename = "pctChange")]
    pct_change: Option<String>,
}

#[async_trait]
impl QuoteProvider for AwesomeApiProvider {
    async fn fetch_quote(
        &self,
        series: SeriesKind,
    ) -> Result<QuoteObservation, QuoteProviderError> {
        if series != SeriesKind::Usd {
            return Err(QuoteProviderError::Unsupported);
        }

        let resp = self
            .client
            .get(LAST_QUOTE_URL)
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

        let body: AwesomeApiResponse = resp
            .json()
            .await
            .map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

        let quote = body.usd_brl.ok_or_else(|| {
            QuoteProviderError::BadResponse("missing USDBRL quote in response".into())
        })?;

        let value = quote
            .bid
            .parse::<f64>()
            .map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

        // pctChange is optional on some endpoints; a missing or unparsable
        // value reads as no change rather than a failed quote.
        let change_pct = quote
            .pct_change
            .as_deref()
            .and_then(|raw| raw.parse::<f64>().ok())
            .unwrap_or(0.0);

        Ok(QuoteObservation { value, change_pct })
    }
}
