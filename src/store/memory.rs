//! In-process store. Contents vanish with the process.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{KeyValueStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.docs.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.docs.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.docs.write().await.remove(key);
        Ok(())
    }
}
