use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::store::{BlobStore, StoreError};

/// One JSON file per key under a data directory. Writes land in a temp file
/// first and are renamed into place, so readers never observe torn JSON.
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    // Keys are flat file names; anything that could escape the data
    // directory is rejected.
    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(key))
    }
}

#[async_trait]
impl BlobStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.resolve(key)?;
        match fs::read_to_string(&path).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn put(&self, key: &str, payload: String) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        fs::create_dir_all(&self.data_dir).await?;
        let tmp = self.data_dir.join(format!("{}.tmp", key));
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
