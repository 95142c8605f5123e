//! Page sessions.
//!
//! Every page load mounts its own components on the server: a chat window and
//! a sidebar. A [`PageSession`] bundles them under a UUID that the page sends
//! back with each htmx request. Reloading the page mounts a fresh session, so
//! transcripts never outlive the page that showed them.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pichat_web::api::ApiClient;
//! use pichat_web::config::ApiConfig;
//! use pichat_web::session::{MountOptions, SessionStore};
//! use pichat_web::storage::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&ApiConfig::default())?;
//! let store = SessionStore::new();
//! let session = store
//!     .mount(&client, Arc::new(MemoryStore::new()), &MountOptions::default())
//!     .await;
//!
//! session.chat().submit("Hello!");
//! assert_eq!(session.chat().message_count(), 1);
//! # Ok(())
//! # }
//! ```

mod store;

pub use store::{MountOptions, PageSession, SessionStore};
