use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Bytes;
use tracing::debug;

use super::{public_url, ObjectStore, StorageError, StoredObject};
use crate::config::StorageConfig;

/// Writes objects below a root directory and serves them from a base URL.
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.root_dir, &config.public_base_url)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<StoredObject, StorageError> {
        if key.split('/').any(|part| part.is_empty() || part == "..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(StoredObject {
            key: key.to_string(),
            url: public_url(&self.public_base_url, key),
        })
    }
}
