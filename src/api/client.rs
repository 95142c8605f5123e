//! Stateless HTTP client for the backend API.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::chat::ChatApi;
use super::error::ApiError;
use super::types::{
    ChatOutcome, ChatRequest, HealthStatus, LoadModelRequest, ModelsResponse, UnloadModelRequest,
    error_detail,
};
use crate::config::ApiConfig;

/// HTTP client for the backend API.
///
/// # Example
///
/// ```rust,no_run
/// use pichat_web::api::ApiClient;
/// use pichat_web::config::ApiConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(&ApiConfig::default())?;
///
/// if let Some(list) = client.get_models().await {
///     println!("{:?}", list.models);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the configured base URL.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(config: &ApiConfig, http: reqwest::Client) -> Result<Self, ApiError> {
        // A trailing slash keeps any path prefix of the base when joining.
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            base_url: Url::parse(&base)?,
            http,
        })
    }

    /// A chat handle with its own loading flag and last-response slot.
    pub fn chat(&self) -> ChatApi {
        ChatApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// `POST /api/chat`, classified into a [`ChatOutcome`].
    pub async fn post_chat(&self, request: &ChatRequest) -> ChatOutcome {
        let url = self.url("api/chat");
        let response = match self.http.post(url).json(request).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(name: "api.chat.network", error = %e, "Chat request failed");
                return ChatOutcome::Network(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .as_ref()
                .and_then(error_detail);
            tracing::warn!(
                name: "api.chat.status",
                status = status.as_u16(),
                detail = ?detail,
                "Chat request returned an error status"
            );
            return ChatOutcome::Status {
                status: status.as_u16(),
                detail,
            };
        }

        match response.json().await {
            Ok(reply) => ChatOutcome::Reply(reply),
            Err(e) => {
                tracing::warn!(name: "api.chat.decode", error = %e, "Unreadable chat reply");
                ChatOutcome::Network(e.to_string())
            }
        }
    }

    /// `GET /api/models`; `None` on any failure.
    pub async fn get_models(&self) -> Option<ModelsResponse> {
        let result = self.get_json("api/models").await;
        Self::quietly("api.models.list", result)
    }

    /// `POST /api/models/load`; `None` on any failure.
    pub async fn load_model(&self, request: &LoadModelRequest) -> Option<Value> {
        let result = self.post_json("api/models/load", request).await;
        Self::quietly("api.models.load", result)
    }

    /// `POST /api/models/unload`; `None` on any failure.
    pub async fn unload_model(&self, request: &UnloadModelRequest) -> Option<Value> {
        let result = self.post_json("api/models/unload", request).await;
        Self::quietly("api.models.unload", result)
    }

    /// `GET /api/health`.
    pub async fn check_health(&self) -> HealthStatus {
        let response = match self.http.get(self.url("api/health")).send().await {
            Ok(r) => r,
            Err(e) => return HealthStatus::unhealthy(Some(e.to_string())),
        };
        if !response.status().is_success() {
            return HealthStatus::unhealthy(None);
        }
        match response.json::<Value>().await {
            Ok(info) => HealthStatus::healthy(info),
            Err(e) => HealthStatus::unhealthy(Some(e.to_string())),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Url {
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .as_ref()
                .and_then(error_detail);
            Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            })
        }
    }

    /// Drops the error after logging it at debug level.
    fn quietly<T>(operation: &'static str, result: Result<T, ApiError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(operation, network = e.is_network(), error = %e, "Backend call failed");
                None
            }
        }
    }
}
