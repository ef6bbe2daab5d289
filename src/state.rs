use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{MemoryStore, Store};
use crate::realtime::ConnectionManager;
use crate::storage::{MemoryObjectStore, ObjectStore};

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub objects: Arc<dyn ObjectStore>,
    pub realtime: ConnectionManager,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>, config: AppConfig) -> Self {
        let realtime = ConnectionManager::new(config.realtime.channel_capacity);
        Self {
            store,
            objects,
            realtime,
            config: Arc::new(config),
        }
    }

    /// Everything in process memory.
    pub fn in_memory(config: AppConfig) -> Self {
        let objects = Arc::new(MemoryObjectStore::new(config.storage.public_base_url.clone()));
        Self::new(Arc::new(MemoryStore::new()), objects, config)
    }
}
