//! Sidebar markup.

use std::fmt::Write as _;

use crate::sidebar::Sidebar;
use crate::ui::{escape, session_path};

pub fn sidebar(session_id: &str, sidebar: &Sidebar) -> String {
    let path = session_path(session_id);
    let models = sidebar.models();

    let mut rows = String::new();
    if models.is_empty() {
        rows.push_str(r#"<div class="muted">No models detected</div>"#);
    }
    for model in &models {
        let name = escape(&model.name);
        let _ = write!(
            rows,
            r#"<div class="model-item">
                <div class="model-name">{name}</div>
                <div class="model-actions">
                    <form hx-post="{path}/models/load" hx-swap="none"><input type="hidden" name="model" value="{name}"><button type="submit">Load</button></form>
                    <form hx-post="{path}/models/unload" hx-swap="none"><input type="hidden" name="model" value="{name}"><button type="submit">Unload</button></form>
                </div>
            </div>"#
        );
    }

    format!(
        r##"<aside class="sidebar">
    <div class="sidebar-section">
        <h3>Model Management</h3>
        <div class="model-list">{rows}</div>
    </div>
    <div class="sidebar-section">
        <h3>Conversations</h3>
        <div class="conversations">
            <button hx-post="{path}/history/clear" hx-target="#history-status" hx-swap="innerHTML">Clear History</button>
            <div id="history-status" class="muted">Saved locally</div>
        </div>
    </div>
</aside>"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, Model};
    use crate::config::ApiConfig;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn empty_sidebar() -> Sidebar {
        let client = ApiClient::new(&ApiConfig::default()).unwrap();
        Sidebar::new(client, Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_empty_list_message() {
        let html = sidebar("abc", &empty_sidebar());
        assert!(html.contains("No models detected"));
        assert!(html.contains(r#"hx-post="/ui/sessions/abc/history/clear""#));
    }

    #[test]
    fn test_rows_per_model() {
        let sidebar = empty_sidebar().with_models(vec![
            Model::named("llama3.2"),
            Model::named(r#"evil"><script>"#),
        ]);
        let html = super::sidebar("abc", &sidebar);

        assert!(!html.contains("No models detected"));
        assert_eq!(html.matches(r#"class="model-item""#).count(), 2);
        assert!(html.contains(r#"<div class="model-name">llama3.2</div>"#));
        assert!(html.contains(r#"value="evil&quot;&gt;&lt;script&gt;""#));
        assert!(html.contains(r#"hx-post="/ui/sessions/abc/models/unload""#));
    }
}
