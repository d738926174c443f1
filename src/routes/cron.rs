// Scheduled refresh trigger, called by the hosting platform's cron

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::RefreshSummary;
use crate::services::market_service;
use crate::state::AppState;

// ==============================================================================
// Router
// ==============================================================================

pub fn router() -> Router<AppState> {
    Router::new().route("/market", get(trigger_market_refresh))
}

// ==============================================================================
// Handlers
// ==============================================================================

/// GET /api/cron/market
///
/// Runs one refresh cycle against the live providers (cache bypassed) and
/// reports per-series counters. In production the caller must present the
/// shared cron secret as a bearer token.
async fn trigger_market_refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshSummary>, AppError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok());
    authorize(&state.config, auth_header)?;

    info!("GET /api/cron/market - Scheduled market refresh");
    let outcome = market_service::run_refresh_cycle(
        &state.store,
        state.quote_provider.as_ref(),
        &state.quote_cache,
        state.clock.as_ref(),
        false,
    )
    .await;

    if outcome.has_fetch_error() {
        warn!("Market refresh finished with fetch failures");
    }

    Ok(Json(outcome.summary()))
}

// ==============================================================================
// Helper Functions
// ==============================================================================

/// Outside production any caller may trigger a refresh; in production the
/// request must carry `Authorization: Bearer <CRON_SECRET>`.
fn authorize(config: &AppConfig, auth_header: Option<&str>) -> Result<(), AppError> {
    if !config.is_production() {
        return Ok(());
    }

    let expected = match config.cron_secret.as_deref() {
        Some(secret) => format!("Bearer {}", secret),
        None => {
            warn!("CRON_SECRET is not set; rejecting cron trigger");
            return Err(AppError::Unauthorized);
        }
    };

    match auth_header {
        Some(header) if header == expected => Ok(()),
        _ => {
            warn!("Unauthorized cron trigger attempt");
            Err(AppError::Unauthorized)
        }
    }
}
