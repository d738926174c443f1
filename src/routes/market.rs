// Market overview endpoint backing the dashboard header widget

use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use crate::models::MarketOverview;
use crate::services::market_service;
use crate::state::AppState;

// ==============================================================================
// Router
// ==============================================================================

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_market_overview))
}

// ==============================================================================
// Handlers
// ==============================================================================

/// GET /api/market
///
/// Current USD/BRL and Ibovespa quotes plus the rolling 7-day history for
/// both series. Never fails: when live data is unavailable the response
/// carries fallback values with `hasError` set.
async fn get_market_overview(State(state): State<AppState>) -> Json<MarketOverview> {
    info!("GET /api/market - Market overview");
    let overview = market_service::market_overview(
        &state.store,
        state.quote_provider.as_ref(),
        &state.quote_cache,
        state.clock.as_ref(),
    )
    .await;
    Json(overview)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_compile() {
        // This test ensures the routes compile correctly
        let _router = router();
    }
}
