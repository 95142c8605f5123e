//! Client for the chat backend's HTTP API.
//!
//! Every public operation is total: network failures, error statuses and
//! unreadable bodies are turned into values at this boundary instead of being
//! returned as errors.
//!
//! - [`ApiClient`]: stateless, cheap to clone; models, health and raw chat calls
//! - [`ChatApi`]: per-window chat handle with a loading flag and the
//!   last-response slot

mod chat;
mod client;
pub mod error;
pub mod types;

pub use chat::ChatApi;
pub use client::ApiClient;
pub use error::ApiError;
pub use types::{
    ChatOutcome, ChatRequest, ChatResponse, HealthStatus, LoadModelRequest, Model,
    ModelsResponse, UnloadModelRequest,
};

/// Model used when a chat request does not name one.
pub const DEFAULT_MODEL: &str = "llama3.2";
