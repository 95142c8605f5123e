//! Model management sidebar.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::api::{ApiClient, LoadModelRequest, Model, UnloadModelRequest};
use crate::storage::{KeyValueStore, StoreError};

/// Keep-alive hint sent with every load.
pub const LOAD_KEEP_ALIVE: &str = "30m";

/// Storage key holding the persisted chat history.
pub const HISTORY_KEY: &str = "chat_history";

/// Sidebar component of one page.
///
/// The model list is fetched once by [`Sidebar::mount`] and is never
/// refreshed afterwards, not even after a load or unload.
#[derive(Debug)]
pub struct Sidebar {
    client: ApiClient,
    store: Arc<dyn KeyValueStore>,
    keep_alive: String,
    models: RwLock<Vec<Model>>,
}

impl Sidebar {
    pub fn new(client: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client,
            store,
            keep_alive: LOAD_KEEP_ALIVE.to_string(),
            models: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = keep_alive.into();
        self
    }

    /// Start from a known model list instead of fetching one.
    #[must_use]
    pub fn with_models(self, models: Vec<Model>) -> Self {
        *self.models.write().unwrap() = models;
        self
    }

    /// Build the sidebar and fetch the model list.
    pub async fn mount(client: ApiClient, store: Arc<dyn KeyValueStore>, keep_alive: &str) -> Self {
        let sidebar = Self::new(client, store).with_keep_alive(keep_alive);
        sidebar.refresh_models().await;
        sidebar
    }

    /// Replace the model list with the backend's, when it sent one.
    async fn refresh_models(&self) {
        let Some(response) = self.client.get_models().await else {
            return;
        };
        if let Some(models) = response.models {
            tracing::debug!(name: "sidebar.models", count = models.len(), "Model list fetched");
            *self.models.write().unwrap() = models;
        }
    }

    /// Models as fetched at mount.
    pub fn models(&self) -> Vec<Model> {
        self.models.read().unwrap().clone()
    }

    pub fn keep_alive(&self) -> &str {
        &self.keep_alive
    }

    /// Ask the backend to load `model` with the keep-alive hint.
    pub async fn load(&self, model: &str) -> Option<Value> {
        tracing::info!(name: "sidebar.model.load", model = %model, keep_alive = %self.keep_alive, "Loading model");
        self.client
            .load_model(&LoadModelRequest {
                model: model.to_string(),
                keep_alive: self.keep_alive.clone(),
            })
            .await
    }

    /// Ask the backend to unload `model`.
    pub async fn unload(&self, model: &str) -> Option<Value> {
        tracing::info!(name: "sidebar.model.unload", model = %model, "Unloading model");
        self.client
            .unload_model(&UnloadModelRequest {
                model: model.to_string(),
            })
            .await
    }

    /// Remove the persisted chat history.
    ///
    /// Only the stored key is removed; the on-screen transcript is untouched.
    pub async fn clear_history(&self) -> Result<bool, StoreError> {
        let removed = self.store.remove(HISTORY_KEY).await?;
        tracing::info!(name: "sidebar.history.cleared", removed, "Cleared chat history");
        Ok(removed)
    }
}
