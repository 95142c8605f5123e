use std::sync::Arc;
use std::time::Duration;

use pichat_web::api::{ApiClient, ChatOutcome, ChatRequest, LoadModelRequest};
use pichat_web::chat::{ChatWindow, Message};
use pichat_web::config::ApiConfig;
use pichat_web::sidebar::Sidebar;
use pichat_web::storage::MemoryStore;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base: &str) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: base.to_string(),
    })
    .unwrap()
}

/// Nothing listens on the discard port.
fn unreachable_client() -> ApiClient {
    client("http://127.0.0.1:9")
}

async fn wait_for_messages(window: &ChatWindow, count: usize) -> Vec<Message> {
    let mut rx = window.subscribe();
    let messages = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|m| m.len() >= count))
        .await
        .expect("timed out waiting for transcript")
        .expect("transcript closed")
        .clone();
    messages
}

#[tokio::test]
async fn test_send_appends_user_then_assistant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({"message": "Hello", "model": "llama3.2", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Hi there",
            "model": "llama3.2",
            "processing_time": 0.42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let window = ChatWindow::new(client(&server.uri()).chat(), "llama3.2");
    let pending = window.submit("Hello").unwrap();
    assert!(window.is_loading());

    let outcome = pending.await;
    assert_eq!(outcome.reply().unwrap().response, "Hi there");
    assert_eq!(outcome.reply().unwrap().extra["processing_time"], json!(0.42));

    let messages = wait_for_messages(&window, 2).await;
    assert_eq!(
        messages,
        vec![Message::user("Hello"), Message::assistant("Hi there")]
    );
    assert!(!window.is_loading());
}

#[tokio::test]
async fn test_error_status_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "model not loaded"})),
        )
        .mount(&server)
        .await;

    let window = ChatWindow::new(client(&server.uri()).chat(), "llama3.2");
    let outcome = window.submit("Hello").unwrap().await;
    assert_eq!(
        outcome,
        ChatOutcome::Status {
            status: 500,
            detail: Some("model not loaded".to_string())
        }
    );

    let messages = wait_for_messages(&window, 2).await;
    assert_eq!(messages[1], Message::assistant("Error: 500 model not loaded"));
    assert!(!window.is_loading());
}

#[tokio::test]
async fn test_error_status_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = client(&server.uri()).chat();
    let outcome = api.send_message(ChatRequest::new("Hello")).await;
    assert_eq!(outcome.display_text(), "Error: 503");
    assert_eq!(api.last_response().as_deref(), Some("Error: 503"));
}

#[tokio::test]
async fn test_network_error() {
    let window = ChatWindow::new(unreachable_client().chat(), "llama3.2");
    let outcome = window.submit("Hello").unwrap().await;
    assert!(matches!(outcome, ChatOutcome::Network(_)));

    let messages = wait_for_messages(&window, 2).await;
    assert!(messages[1].text.starts_with("Network error: "));
    assert!(!window.is_loading());
}

#[tokio::test]
async fn test_unreadable_reply_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let outcome = client(&server.uri())
        .post_chat(&ChatRequest::new("Hello"))
        .await;
    assert!(outcome.display_text().starts_with("Network error: "));
}

#[tokio::test]
async fn test_blank_input_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "unused"})))
        .expect(0)
        .mount(&server)
        .await;

    let window = ChatWindow::new(client(&server.uri()).chat(), "llama3.2");
    assert!(window.submit("   ").is_none());
    assert_eq!(window.message_count(), 0);
    assert!(!window.is_loading());
}

#[tokio::test]
async fn test_replies_land_in_resolution_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"message": "slow"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "slow reply"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"message": "fast"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "fast reply"})))
        .mount(&server)
        .await;

    let window = ChatWindow::new(client(&server.uri()).chat(), "llama3.2");
    let slow = tokio::spawn(window.submit("slow").unwrap());
    let fast = tokio::spawn(window.submit("fast").unwrap());

    let messages = wait_for_messages(&window, 4).await;
    assert_eq!(
        messages,
        vec![
            Message::user("slow"),
            Message::user("fast"),
            Message::assistant("fast reply"),
            Message::assistant("slow reply"),
        ]
    );

    slow.await.unwrap();
    fast.await.unwrap();
    assert!(!window.is_loading());
}

#[tokio::test]
async fn test_get_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "llama3.2", "size": 2_019_393_189u64}, {"name": "qwen2.5:0.5b"}]
        })))
        .mount(&server)
        .await;

    let models = client(&server.uri()).get_models().await.unwrap().models.unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[1].name, "qwen2.5:0.5b");
}

#[tokio::test]
async fn test_failures_yield_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/models/load"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "no such model"})))
        .mount(&server)
        .await;

    let c = client(&server.uri());
    assert!(c.get_models().await.is_none());
    assert!(
        c.load_model(&LoadModelRequest {
            model: "nope".to_string(),
            keep_alive: "30m".to_string(),
        })
        .await
        .is_none()
    );

    let down = unreachable_client();
    assert!(down.get_models().await.is_none());
}

#[tokio::test]
async fn test_sidebar_load_and_unload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"models": [{"name": "llama3.2"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/models/load"))
        .and(body_json(json!({"model": "llama3.2", "keep_alive": "30m"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "loaded"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/models/unload"))
        .and(body_json(json!({"model": "llama3.2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "unloaded"})))
        .expect(1)
        .mount(&server)
        .await;

    let sidebar = Sidebar::mount(
        client(&server.uri()),
        Arc::new(MemoryStore::new()),
        "30m",
    )
    .await;
    assert_eq!(sidebar.models().len(), 1);

    assert_eq!(sidebar.load("llama3.2").await, Some(json!({"status": "loaded"})));
    assert_eq!(
        sidebar.unload("llama3.2").await,
        Some(json!({"status": "unloaded"}))
    );

    // The list is not refetched after load or unload.
    assert_eq!(sidebar.models()[0].name, "llama3.2");
}

#[tokio::test]
async fn test_check_health() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .mount(&server)
        .await;

    let status = client(&server.uri()).check_health().await;
    assert!(status.ok);
    assert_eq!(status.info, Some(json!({"status": "healthy"})));

    let status = unreachable_client().check_health().await;
    assert!(!status.ok);
    assert!(status.error.is_some());
}

#[tokio::test]
async fn test_check_health_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"status": "down"})))
        .mount(&server)
        .await;

    let status = client(&server.uri()).check_health().await;
    assert!(!status.ok);
    assert!(status.error.is_none());
    assert!(status.info.is_none());
}
