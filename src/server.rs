use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::session::PageSession;
use crate::ui;

/// How often idle page sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(healthz))
        .route("/ui/health", get(health_fragment))
        .route("/ui/sessions/{id}/messages", get(messages_fragment))
        .route("/ui/sessions/{id}/send", post(send_message))
        .route("/ui/sessions/{id}/models/load", post(load_model))
        .route("/ui/sessions/{id}/models/unload", post(unload_model))
        .route("/ui/sessions/{id}/history/clear", post(clear_history))
        .route("/ui/sessions/{id}/close", post(close_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    info!(
        name: "api.config.loaded",
        base_url = %config.api.base_url,
        model = %config.chat.default_model,
        "Backend configuration loaded"
    );

    let state = AppState::new(Arc::clone(&config))?;

    let sweeper = CancellationToken::new();
    spawn_session_sweeper(state.clone(), config.sessions.idle_timeout(), sweeper.clone());

    let app = router(state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.cancel();
    state.health.shutdown().await;
    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(name: "server.signal.failed", error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Periodically tear down sessions whose page went away without closing.
fn spawn_session_sweeper(state: AppState, idle_timeout: Duration, cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let removed = state.sessions.cleanup_expired_with_timeout(idle_timeout);
            if removed > 0 {
                info!(name: "session.swept", removed, remaining = state.sessions.len(), "Removed idle sessions");
            }
        }
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Mount a fresh page session and render the full page.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let session = state
        .sessions
        .mount(&state.client, Arc::clone(&state.storage), &state.mount_options())
        .await;

    Html(ui::layout::page(&ui::layout::PageContext {
        ui: &state.config.ui,
        session: &session,
        health: &state.health.current(),
        health_interval_secs: state.config.health.interval().as_secs(),
        api_base: &state.config.api.base_url,
    }))
}

/// GET /healthz - Liveness of this server, not the backend.
async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct HealthQuery {
    #[serde(default)]
    session: Option<String>,
}

/// GET /ui/health - Health indicator fragment.
///
/// The page's periodic refresh names its session, which marks it active.
/// An unknown session still gets the indicator, without the session.
async fn health_fragment(
    State(state): State<AppState>,
    Query(query): Query<HealthQuery>,
) -> Html<String> {
    let session = query.session.and_then(|id| state.sessions.get(&id));
    Html(ui::health::indicator(
        &state.health.current(),
        state.config.health.interval().as_secs(),
        session.as_ref().map(PageSession::id),
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Fragment Handlers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SendForm {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ModelForm {
    model: String,
}

fn session_expired() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(r#"<div class="session-expired muted">Session expired, reload the page.</div>"#),
    )
        .into_response()
}

fn lookup(state: &AppState, id: &str) -> Result<PageSession, Response> {
    state.sessions.get(id).ok_or_else(|| {
        tracing::debug!(name: "session.missing", session_id = %id, "Unknown page session");
        session_expired()
    })
}

/// GET /ui/sessions/:id/messages - Transcript poll.
async fn messages_fragment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, Response> {
    let session = lookup(&state, &id)?;
    Ok(Html(ui::chat::transcript_update(&id, session.chat())))
}

/// POST /ui/sessions/:id/send - Send the composed message.
///
/// Returns as soon as the request is dispatched; the transcript then polls
/// until the reply lands.
async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SendForm>,
) -> Result<Html<String>, Response> {
    let session = lookup(&state, &id)?;
    let chat = session.chat();

    chat.set_input(form.message);
    if let Some(pending) = chat.on_send() {
        tokio::spawn(pending);
    }

    Ok(Html(ui::chat::transcript_update(&id, chat)))
}

/// POST /ui/sessions/:id/models/load
async fn load_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ModelForm>,
) -> Result<StatusCode, Response> {
    let session = lookup(&state, &id)?;
    session.sidebar().load(&form.model).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /ui/sessions/:id/models/unload
async fn unload_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ModelForm>,
) -> Result<StatusCode, Response> {
    let session = lookup(&state, &id)?;
    session.sidebar().unload(&form.model).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /ui/sessions/:id/history/clear
async fn clear_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<&'static str>, Response> {
    let session = lookup(&state, &id)?;
    match session.sidebar().clear_history().await {
        Ok(true) => Ok(Html("History cleared")),
        Ok(false) => Ok(Html("Nothing to clear")),
        Err(e) => {
            tracing::error!(name: "sidebar.history.failed", error = %e, "Failed to clear history");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("Could not clear history"),
            )
                .into_response())
        }
    }
}

/// POST /ui/sessions/:id/close - Page is going away.
async fn close_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    match state.sessions.remove(&id) {
        Some(_) => {
            tracing::debug!(name: "session.closed", session_id = %id, "Page session closed");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}
