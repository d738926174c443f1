//! Market History Refresh Background Job
//!
//! Runs the same reconciliation cycle as the cron HTTP trigger: fetch the
//! tracked market series, merge them into the rolling 7-day history and
//! persist the document when something changed.
//!
//! # Error Handling
//!
//! - A failed series fetch is counted and skipped; the other series still
//!   updates
//! - Store failures are logged inside the cycle and the previous document
//!   stays in effect

use crate::errors::AppError;
use crate::services::job_scheduler_service::{JobContext, JobResult};
use crate::services::market_service;
use tracing::info;

/// Entry point called by the job scheduler.
pub async fn refresh_market_history(ctx: JobContext) -> Result<JobResult, AppError> {
    info!("📊 Starting market history refresh job");

    let outcome = market_service::run_refresh_cycle(
        &ctx.store,
        ctx.quote_provider.as_ref(),
        &ctx.quote_cache,
        ctx.clock.as_ref(),
        false,
    )
    .await;

    let mut processed = 0;
    let mut failed = 0;
    for series in [&outcome.usd, &outcome.ibovespa] {
        if series.changed {
            processed += 1;
        }
        if series.fetch_failed {
            failed += 1;
        }
    }

    info!(
        "✅ Market history refresh finished (changed: {}, fetch failures: {}, persisted: {})",
        processed, failed, outcome.persisted
    );

    Ok(JobResult {
        items_processed: processed,
        items_failed: failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::quote_provider::{
        QuoteObservation, QuoteProvider, QuoteProviderError, SeriesKind,
    };
    use crate::services::clock::FixedClock;
    use crate::services::quote_cache::QuoteCache;
    use crate::store::{JsonStore, MemoryStore};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    struct HalfFailingProvider;

    #[async_trait]
    impl QuoteProvider for HalfFailingProvider {
        async fn fetch_quote(
            &self,
            series: SeriesKind,
        ) -> Result<QuoteObservation, QuoteProviderError> {
            match series {
                SeriesKind::Usd => Ok(QuoteObservation {
                    value: 5.44,
                    change_pct: 0.2,
                }),
                SeriesKind::Ibovespa => {
                    Err(QuoteProviderError::Network("connection refused".to_string()))
                }
            }
        }
    }

    #[tokio::test]
    async fn job_counts_changed_and_failed_series() {
        let ctx = JobContext {
            store: JsonStore::new(Arc::new(MemoryStore::new())),
            quote_provider: Arc::new(HalfFailingProvider),
            quote_cache: QuoteCache::new(60),
            clock: Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 5, 10, 15, 0, 0).unwrap())),
        };

        let result = refresh_market_history(ctx).await.unwrap();

        assert_eq!(result.items_processed, 1);
        assert_eq!(result.items_failed, 1);
    }
}
