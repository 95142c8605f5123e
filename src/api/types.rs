//! Wire types for the backend API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::DEFAULT_MODEL;

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub model: String,
    /// Sent to the backend; replies are always read as one JSON document.
    pub stream: bool,
}

impl ChatRequest {
    /// Request for `message` with the default model and streaming off.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: DEFAULT_MODEL.to_string(),
            stream: false,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Successful reply of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// Server extras (`model`, `timestamp`, `processing_time`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a chat send, one variant per failure class.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// The backend answered with a success status and a readable body.
    Reply(ChatResponse),
    /// The backend answered with an error status.
    Status { status: u16, detail: Option<String> },
    /// The request could not be completed or the reply body was unreadable.
    Network(String),
}

impl ChatOutcome {
    /// Text shown in the transcript for this outcome.
    pub fn display_text(&self) -> String {
        match self {
            Self::Reply(reply) => reply.response.clone(),
            Self::Status {
                status,
                detail: Some(detail),
            } if !detail.is_empty() => format!("Error: {status} {detail}"),
            Self::Status { status, .. } => format!("Error: {status}"),
            Self::Network(reason) => format!("Network error: {reason}"),
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Reply(_))
    }

    /// The parsed reply, if the call succeeded.
    pub fn reply(&self) -> Option<&ChatResponse> {
        match self {
            Self::Reply(reply) => Some(reply),
            _ => None,
        }
    }
}

/// A model as listed by `GET /api/models`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    /// Opaque server fields (`size`, `modified_at`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Model {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// Body of `GET /api/models`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelsResponse {
    /// Absent when the backend sends a body without a `models` field.
    #[serde(default)]
    pub models: Option<Vec<Model>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /api/models/load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadModelRequest {
    pub model: String,
    /// How long the backend should keep the model resident, e.g. `"30m"`.
    pub keep_alive: String,
}

/// Body of `POST /api/models/unload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnloadModelRequest {
    pub model: String,
}

/// Outcome of one `GET /api/health` check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn healthy(info: Value) -> Self {
        Self {
            ok: true,
            info: Some(info),
            error: None,
        }
    }

    pub fn unhealthy(error: Option<String>) -> Self {
        Self {
            ok: false,
            info: None,
            error,
        }
    }
}

/// Pulls a displayable `detail` out of an error body.
///
/// String details are used as-is; structured ones (e.g. validation errors)
/// are rendered as compact JSON.
pub(crate) fn error_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
