use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{auth, cron, health, market, reserves};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    // The dashboard frontend is served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/market", market::router())
        .nest("/api/cron", cron::router())
        .nest("/api/auth", auth::router())
        .nest("/api/reserves", reserves::router())
        .layer(cors)
        .with_state(state)
}
