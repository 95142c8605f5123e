//! Page session and session storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::{ApiClient, DEFAULT_MODEL};
use crate::chat::ChatWindow;
use crate::sidebar::{LOAD_KEEP_ALIVE, Sidebar};
use crate::storage::KeyValueStore;

/// Default idle timeout (30 minutes).
const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Per-mount settings for the page components.
#[derive(Debug, Clone)]
pub struct MountOptions {
    /// Model used by the chat window.
    pub model: String,
    /// Keep-alive hint used by the sidebar's load action.
    pub keep_alive: String,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            keep_alive: LOAD_KEEP_ALIVE.to_string(),
        }
    }
}

/// The components mounted for one page load.
#[derive(Debug, Clone)]
pub struct PageSession {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    chat: ChatWindow,
    sidebar: Sidebar,
    last_activity: RwLock<DateTime<Utc>>,
}

impl PageSession {
    fn new(id: String, chat: ChatWindow, sidebar: Sidebar) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id,
                chat,
                sidebar,
                last_activity: RwLock::new(Utc::now()),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn chat(&self) -> &ChatWindow {
        &self.inner.chat
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.inner.sidebar
    }

    /// Update the last activity timestamp.
    pub fn touch(&self) {
        *self.inner.last_activity.write().unwrap() = Utc::now();
    }

    /// Check if the session has been idle longer than `timeout`.
    ///
    /// A send in flight keeps the session alive.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        if self.inner.chat.is_loading() {
            return false;
        }
        let last = *self.inner.last_activity.read().unwrap();
        match (Utc::now() - last).to_std() {
            Ok(idle) => idle >= timeout,
            // Negative duration means clock skew.
            Err(_) => false,
        }
    }

    /// Tear the page's components down.
    fn close(&self) {
        self.inner.chat.close();
    }
}

/// Thread-safe store of mounted pages.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    sessions: RwLock<HashMap<String, PageSession>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Mount the components of a new page and register them.
    ///
    /// Fetches the sidebar's model list before returning.
    pub async fn mount(
        &self,
        client: &ApiClient,
        storage: Arc<dyn KeyValueStore>,
        options: &MountOptions,
    ) -> PageSession {
        let id = Uuid::new_v4().to_string();
        let chat = ChatWindow::new(client.chat(), options.model.clone());
        let sidebar = Sidebar::mount(client.clone(), storage, &options.keep_alive).await;

        let session = PageSession::new(id.clone(), chat, sidebar);
        self.inner
            .sessions
            .write()
            .unwrap()
            .insert(id, session.clone());

        tracing::debug!(
            name: "session.mounted",
            session_id = %session.id(),
            models = session.sidebar().models().len(),
            "Page session mounted"
        );
        session
    }

    /// Get a session by ID, marking it active.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<PageSession> {
        let session = self.inner.sessions.read().unwrap().get(id).cloned();
        if let Some(s) = &session {
            s.touch();
        }
        session
    }

    /// Remove a session and tear it down.
    pub fn remove(&self, id: &str) -> Option<PageSession> {
        let removed = self.inner.sessions.write().unwrap().remove(id);
        if let Some(session) = &removed {
            session.close();
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions idle for longer than the default timeout.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_with_timeout(DEFAULT_SESSION_TIMEOUT)
    }

    /// Remove sessions that have been inactive longer than the timeout.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.sessions.write().unwrap();
        let before = guard.len();
        guard.retain(|_, session| {
            let expired = session.is_expired_with_timeout(timeout);
            if expired {
                session.close();
            }
            !expired
        });
        before - guard.len()
    }
}
