// Emergency reserve slots, scoped per user

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::ReserveSlot;
use crate::services::reserve_service;
use crate::state::AppState;

// ==============================================================================
// Router
// ==============================================================================

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_reserves).post(replace_reserves))
}

// ==============================================================================
// Request Types
// ==============================================================================

#[derive(Debug, Deserialize)]
struct ReserveQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

impl ReserveQuery {
    fn require_user_id(self) -> Result<String, AppError> {
        match self.user_id {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(AppError::Validation("userId is required".to_string())),
        }
    }
}

// ==============================================================================
// Handlers
// ==============================================================================

/// GET /api/reserves?userId=...
///
/// All reserve slots belonging to the user.
async fn list_reserves(
    State(state): State<AppState>,
    Query(query): Query<ReserveQuery>,
) -> Result<Json<Vec<ReserveSlot>>, AppError> {
    let user_id = query.require_user_id()?;
    info!("GET /api/reserves - Listing slots for user {}", user_id);
    let slots = reserve_service::list_for_user(&state.store, &user_id).await;
    Ok(Json(slots))
}

/// POST /api/reserves?userId=...
///
/// Replaces the user's slots with the posted set.
async fn replace_reserves(
    State(state): State<AppState>,
    Query(query): Query<ReserveQuery>,
    Json(slots): Json<Vec<ReserveSlot>>,
) -> Result<Json<Value>, AppError> {
    let user_id = query.require_user_id()?;
    info!(
        "POST /api/reserves - Replacing slots for user {} ({} incoming)",
        user_id,
        slots.len()
    );
    reserve_service::replace_for_user(&state.store, &user_id, slots).await?;
    Ok(Json(json!({ "success": true })))
}
