use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::User;
use crate::services::clock::{self, Clock};
use crate::store::JsonStore;

/// Store key for the user registry.
pub const USERS_KEY: &str = "users.json";

/// Looks a user up by name (case-insensitive) and creates one on miss.
pub async fn find_or_create(
    store: &JsonStore,
    clock: &dyn Clock,
    name: &str,
) -> Result<User, AppError> {
    let mut users: Vec<User> = store.read(USERS_KEY, Vec::new()).await;

    let wanted = name.to_lowercase();
    if let Some(user) = users.iter().find(|u| u.name.to_lowercase() == wanted) {
        return Ok(user.clone());
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        created_at: clock::iso_timestamp(clock),
    };
    users.push(user.clone());
    store.write(USERS_KEY, &users).await?;

    info!("👤 Created user {} ({})", user.name, user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::FixedClock;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn setup() -> (JsonStore, FixedClock) {
        (
            JsonStore::new(Arc::new(MemoryStore::new())),
            FixedClock(Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap()),
        )
    }

    #[tokio::test]
    async fn creates_user_on_first_login() {
        let (store, clock) = setup();
        let user = find_or_create(&store, &clock, "Maria").await.unwrap();

        assert_eq!(user.name, "Maria");
        assert_eq!(user.created_at, "2025-05-10T12:00:00.000Z");
        assert!(!user.id.is_empty());
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let (store, clock) = setup();
        let created = find_or_create(&store, &clock, "Maria").await.unwrap();
        let found = find_or_create(&store, &clock, "mARIA").await.unwrap();

        assert_eq!(found.id, created.id);
        // The stored spelling wins over the lookup spelling.
        assert_eq!(found.name, "Maria");

        let users: Vec<User> = store.read(USERS_KEY, Vec::new()).await;
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn distinct_names_create_distinct_users() {
        let (store, clock) = setup();
        let a = find_or_create(&store, &clock, "Maria").await.unwrap();
        let b = find_or_create(&store, &clock, "João").await.unwrap();
        assert_ne!(a.id, b.id);
    }
}
