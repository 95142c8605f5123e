//! Health indicator fragment.

use crate::health::HealthState;
use crate::ui::escape;

/// Indicator markup; refreshes itself every `interval_secs` (at least 1).
///
/// With a `session_id` the refresh names the page's session, which keeps an
/// open but idle page from being swept.
pub fn indicator(state: &HealthState, interval_secs: u64, session_id: Option<&str>) -> String {
    let body = match state {
        HealthState::Unknown => "Checking...".to_string(),
        HealthState::Healthy { .. } => {
            format!(r#"<span class="healthy">🟢 {}</span>"#, escape(&state.label()))
        }
        HealthState::Unhealthy { error } => {
            let title = error
                .as_deref()
                .map(|e| format!(r#" title="{}""#, escape(e)))
                .unwrap_or_default();
            format!(r#"<span class="down"{title}>🔴 Down</span>"#)
        }
    };

    let every = interval_secs.max(1);
    let url = match session_id {
        Some(id) => format!("/ui/health?session={}", escape(id)),
        None => "/ui/health".to_string(),
    };
    format!(
        r#"<div id="health" class="health" hx-get="{url}" hx-trigger="every {every}s" hx-swap="outerHTML">{body}</div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_renders_checking() {
        let html = indicator(&HealthState::Unknown, 30, None);
        assert!(html.contains("Checking..."));
        assert!(html.contains(r#"hx-trigger="every 30s""#));
    }

    #[test]
    fn test_healthy_renders_server_status() {
        let state = HealthState::Healthy {
            info: Some(json!({"status": "degraded"})),
        };
        let html = indicator(&state, 30, None);
        assert!(html.contains("🟢 degraded"));
    }

    #[test]
    fn test_down_carries_error_as_title() {
        let state = HealthState::Unhealthy {
            error: Some("connection <refused>".to_string()),
        };
        let html = indicator(&state, 30, None);
        assert!(html.contains("🔴 Down"));
        assert!(html.contains(r#"title="connection &lt;refused&gt;""#));
    }

    #[test]
    fn test_zero_interval_renders_as_one_second() {
        let html = indicator(&HealthState::Unknown, 0, None);
        assert!(html.contains(r#"hx-trigger="every 1s""#));
    }

    #[test]
    fn test_refresh_names_session() {
        let html = indicator(&HealthState::Unknown, 30, Some("abc"));
        assert!(html.contains(r#"hx-get="/ui/health?session=abc""#));
    }
}
