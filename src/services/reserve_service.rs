use tracing::info;

use crate::errors::AppError;
use crate::models::ReserveSlot;
use crate::store::JsonStore;

/// Store key for all users' reserve slots.
pub const RESERVES_KEY: &str = "reserves.json";

/// All slots belonging to one user.
pub async fn list_for_user(store: &JsonStore, user_id: &str) -> Vec<ReserveSlot> {
    let all: Vec<ReserveSlot> = store.read(RESERVES_KEY, Vec::new()).await;
    all.into_iter()
        .filter(|slot| slot.user_id == user_id)
        .collect()
}

/// Replaces one user's slots wholesale, leaving other users' slots alone.
/// Incoming slots are stamped with `user_id` regardless of what the client
/// sent.
pub async fn replace_for_user(
    store: &JsonStore,
    user_id: &str,
    slots: Vec<ReserveSlot>,
) -> Result<(), AppError> {
    let mut all: Vec<ReserveSlot> = store.read(RESERVES_KEY, Vec::new()).await;
    all.retain(|slot| slot.user_id != user_id);

    let incoming = slots.len();
    for mut slot in slots {
        slot.user_id = user_id.to_string();
        all.push(slot);
    }

    store.write(RESERVES_KEY, &all).await?;
    info!("💾 Saved {} reserve slots for user {}", incoming, user_id);
    Ok(())
}
