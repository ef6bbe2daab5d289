use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::RwLock;

use super::{public_url, ObjectStore, StorageError, StoredObject};

/// Keeps objects in process memory.
pub struct MemoryObjectStore {
    public_base_url: String,
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<StoredObject, StorageError> {
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(StoredObject {
            key: key.to_string(),
            url: public_url(&self.public_base_url, key),
        })
    }
}
