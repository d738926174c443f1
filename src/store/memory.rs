use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::store::{BlobStore, StoreError};

/// Keeps payloads in process memory. Backs tests and local runs without a
/// data directory; contents vanish on restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, payload: String) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn read_after_write_returns_value() {
        let store = JsonStore::new(Arc::new(MemoryStore::new()));
        store.write("k.json", &42u32).await.unwrap();
        assert_eq!(store.read("k.json", 0u32).await, 42);
    }

    #[tokio::test]
    async fn missing_key_returns_default() {
        let store = JsonStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.read("absent.json", 7u32).await, 7);
        // The default is now persisted.
        assert_eq!(store.read("absent.json", 0u32).await, 7);
    }
}
