mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Opaque key-value storage for JSON payloads. Keys are flat file-style
/// names ("market_history.json"); values are whole documents, always
/// replaced in full.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the stored payload, or `None` when the key has never been
    /// written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the payload under `key`.
    async fn put(&self, key: &str, payload: String) -> Result<(), StoreError>;
}

/// Typed facade over a [`BlobStore`].
///
/// `read` never fails: an absent key persists and returns the default, a
/// corrupt or unreadable payload returns the default (the stored bytes are
/// left untouched for inspection). Callers that must know about write
/// failures use `write` directly.
#[derive(Clone)]
pub struct JsonStore {
    backend: Arc<dyn BlobStore>,
}

impl JsonStore {
    pub fn new(backend: Arc<dyn BlobStore>) -> Self {
        Self { backend }
    }

    pub async fn read<T>(&self, key: &str, default: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        match self.backend.get(key).await {
            Ok(Some(payload)) => {
                if payload.trim().is_empty() {
                    return default;
                }
                match serde_json::from_str(&payload) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!("⚠️ Corrupt payload under key {}: {}. Using default.", key, e);
                        default
                    }
                }
            }
            Ok(None) => {
                if let Err(e) = self.write(key, &default).await {
                    warn!("Failed to seed default for key {}: {}", key, e);
                }
                default
            }
            Err(e) => {
                error!("Storage read failed for key {}: {}. Using default.", key, e);
                default
            }
        }
    }

    pub async fn write<T>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let payload = serde_json::to_string_pretty(value)?;
        self.backend.put(key, payload).await
    }
}
