use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{KeyValueStore, StoreError};

/// In-process store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().unwrap().remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("chat_history").await.unwrap(), None);

        store.set("chat_history", "[]".to_string()).await.unwrap();
        assert_eq!(store.get("chat_history").await.unwrap().as_deref(), Some("[]"));

        assert!(store.remove("chat_history").await.unwrap());
        assert!(!store.remove("chat_history").await.unwrap());
    }
}
