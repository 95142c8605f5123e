use pichat_web::config::AppConfig;
use serial_test::serial;
use std::env;
use std::fs;

const ARGS: [&str; 1] = ["pichat-web"];

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("PICHAT_SERVER__PORT");
        env::remove_var("PICHAT_UI__TITLE");
        env::remove_var("CONFIG_FILE");
        env::remove_var("HOST");
        env::remove_var("PORT");
        env::remove_var("CHAT_API_BASE");
        env::remove_var("CHAT_MODEL");
        env::remove_var("STORAGE_PATH");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.chat.default_model, "llama3.2");
    assert_eq!(config.health.interval_secs, 30);
    assert_eq!(config.sidebar.keep_alive, "30m");
    assert_eq!(config.ui.title, "Raspberry Pi Chatbot");
    assert!(config.storage.path.is_none());
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("PICHAT_SERVER__PORT", "9090");
        env::set_var("PICHAT_UI__TITLE", "Kitchen Pi");
    }

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.ui.title, "Kitchen Pi");

    clear_env_vars();
}

#[test]
#[serial]
fn test_api_base_from_env_and_cli() {
    clear_env_vars();
    unsafe {
        env::set_var("CHAT_API_BASE", "http://pi.local:8000");
    }

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config");
    assert_eq!(config.api.base_url, "http://pi.local:8000");

    // The flag beats its env fallback.
    let config =
        AppConfig::load_from_args(["pichat-web", "--api-base", "http://10.0.0.2:8000", "--port", "4000"])
            .expect("Failed to load config");
    assert_eq!(config.api.base_url, "http://10.0.0.2:8000");
    assert_eq!(config.server.port, 4000);

    clear_env_vars();
}

#[test]
#[serial]
fn test_empty_api_base_rejected() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["pichat-web", "--api-base", "  "]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let config_content = r#"
server:
  port: 7070
chat:
  default_model: "qwen2.5:0.5b"
storage:
  path: "/tmp/pichat-store.json"
    "#;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("pichat.yaml");
    fs::write(&file_path, config_content).expect("Failed to write temp config");

    // Tell AppConfig to use this file via Env Var (the --config fallback)
    unsafe {
        env::set_var("CONFIG_FILE", &file_path);
    }

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.chat.default_model, "qwen2.5:0.5b");
    assert_eq!(config.storage.path.as_deref(), Some("/tmp/pichat-store.json"));
    // Keys the file leaves out keep their defaults.
    assert_eq!(config.sidebar.keep_alive, "30m");

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_fails() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["pichat-web", "--config", "/nonexistent/pichat.yaml"]);
    assert!(result.is_err());
}
