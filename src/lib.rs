//! Browser chat client for a local LLM server.
//!
//! Serves a single page that talks to a backend exposing `/api/chat`,
//! `/api/models` and `/api/health`, and lets the user chat, load and unload
//! models, and watch backend health.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server rendering HTML fragments for HTMX
//! - **API client**: typed wrapper over the backend's HTTP API
//! - **Components**: per-page chat window and model sidebar, held in a
//!   session store
//! - **Health**: one shared background poller
//!
//! # Modules
//!
//! - [`api`]: backend client, chat handle and wire types
//! - [`chat`]: chat window and transcript
//! - [`health`]: periodic health polling
//! - [`session`]: per-page component sessions
//! - [`sidebar`]: model management and history clearing
//! - [`storage`]: local key-value store
//! - [`ui`]: HTML rendering

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod chat;
pub mod config;
pub mod health;
pub mod server;
pub mod session;
pub mod sidebar;
pub mod storage;
pub mod ui;

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::AppConfig;
use crate::health::HealthMonitor;
use crate::session::{MountOptions, SessionStore};
use crate::storage::KeyValueStore;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Backend API client.
    pub client: ApiClient,
    /// Shared health poller.
    pub health: Arc<HealthMonitor>,
    /// Mounted page sessions.
    pub sessions: SessionStore,
    /// Local key-value store.
    pub storage: Arc<dyn KeyValueStore>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build the state and start health polling.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Arc<AppConfig>) -> Result<Self, ApiError> {
        let client = ApiClient::new(&config.api)?;
        let storage = storage::open(config.storage.path.as_deref());
        Ok(Self::with_parts(config, client, storage))
    }

    /// Build the state around an existing client and store.
    pub fn with_parts(
        config: Arc<AppConfig>,
        client: ApiClient,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let health = Arc::new(HealthMonitor::spawn(
            Arc::new(client.clone()),
            config.health.interval(),
        ));
        Self {
            client,
            health,
            sessions: SessionStore::new(),
            storage,
            config,
        }
    }

    /// Options for mounting a new page.
    pub fn mount_options(&self) -> MountOptions {
        MountOptions {
            model: self.config.chat.default_model.clone(),
            keep_alive: self.config.sidebar.keep_alive.clone(),
        }
    }
}
