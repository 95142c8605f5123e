//! Key-value persistence for browser-local state.
//!
//! The sidebar's "clear history" action goes through [`KeyValueStore`], so
//! the backing store can be swapped (memory in tests, a JSON file on disk).

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Storage failure.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt store file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether it was present.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

/// Builds the configured store: a JSON file when `path` is set, memory otherwise.
pub fn open(path: Option<&str>) -> Arc<dyn KeyValueStore> {
    match path {
        Some(p) if !p.trim().is_empty() => Arc::new(JsonFileStore::new(p)),
        _ => Arc::new(MemoryStore::new()),
    }
}
