use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Default backend base URL.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

const DEFAULT_HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the chat backend
    #[arg(long, env = "CHAT_API_BASE")]
    pub api_base: Option<String>,

    /// Model used for chat requests
    #[arg(long, env = "CHAT_MODEL")]
    pub model: Option<String>,

    /// JSON file backing the local key-value store
    #[arg(long, env = "STORAGE_PATH")]
    pub storage_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub chat: ChatConfig,
    pub health: HealthConfig,
    pub sidebar: SidebarConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub sessions: SessionsConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Backend connection settings handed to [`crate::api::ApiClient`].
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    pub default_model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    pub interval_secs: u64,
}

impl HealthConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SidebarConfig {
    pub keep_alive: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionsConfig {
    pub idle_timeout_secs: u64,
}

impl SessionsConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub title: String,
    /// Where the page loads htmx from.
    pub htmx_src: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("api.base_url", DEFAULT_API_BASE)?
            .set_default("chat.default_model", crate::api::DEFAULT_MODEL)?
            .set_default("health.interval_secs", 30)?
            .set_default("sidebar.keep_alive", crate::sidebar::LOAD_KEEP_ALIVE)?
            .set_default("sessions.idle_timeout_secs", 30 * 60)?
            .set_default("ui.title", "Raspberry Pi Chatbot")?
            .set_default("ui.htmx_src", DEFAULT_HTMX_SRC)?;

        // Config file: explicit path is required, ./config.* is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. PICHAT_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("PICHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // CLI flags (and their clap env fallbacks) win over everything else.
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(base) = cli.api_base {
            builder = builder.set_override("api.base_url", base)?;
        }
        if let Some(model) = cli.model {
            builder = builder.set_override("chat.default_model", model)?;
        }
        if let Some(path) = cli.storage_path {
            builder = builder.set_override("storage.path", path)?;
        }

        let cfg = builder.build()?;
        let config: Self = cfg.try_deserialize()?;

        if config.api.base_url.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "api.base_url cannot be empty".to_string(),
            ));
        }
        Ok(config)
    }
}
