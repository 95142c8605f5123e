//! Page shell: header with title and health, body with sidebar and chat.

use crate::config::UiConfig;
use crate::health::HealthState;
use crate::session::PageSession;
use crate::ui::{escape, session_path};

/// Everything the root composition needs to render one page.
#[derive(Debug)]
pub struct PageContext<'a> {
    pub ui: &'a UiConfig,
    pub session: &'a PageSession,
    pub health: &'a HealthState,
    pub health_interval_secs: u64,
    pub api_base: &'a str,
}

/// Render the full page for a freshly mounted session.
pub fn page(ctx: &PageContext<'_>) -> String {
    let title = escape(&ctx.ui.title);
    let htmx_src = escape(&ctx.ui.htmx_src);
    let session_id = ctx.session.id();
    let close_url = format!("{}/close", session_path(session_id));

    let health = super::health::indicator(ctx.health, ctx.health_interval_secs, Some(session_id));
    let sidebar = super::sidebar::sidebar(session_id, ctx.session.sidebar());
    let chat = super::chat::window(session_id, ctx.session.chat(), ctx.api_base);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="htmx-config" content='{HTMX_CONFIG}'>
    <title>{title}</title>
    <script src="{htmx_src}"></script>
    <style>{STYLES}</style>
</head>
<body>
    <div class="app-root">
        <header class="app-header">
            <h1>{title}</h1>
            {health}
        </header>
        <div class="app-body">
            {sidebar}
            <main class="app-main">
                {chat}
            </main>
        </div>
    </div>
    <script>
        window.addEventListener('pagehide', function () {{ navigator.sendBeacon('{close_url}'); }});
    </script>
</body>
</html>"#
    )
}

/// Swap 404 fragments ("session expired") like successes; skip 204s and
/// other errors.
const HTMX_CONFIG: &str = r#"{"responseHandling":[{"code":"204","swap":false},{"code":"[23]..","swap":true},{"code":"404","swap":true,"error":false},{"code":"[45]..","swap":false,"error":true}]}"#;

const STYLES: &str = r"
:root {
  --bg: #0f1115;
  --surface: #171a21;
  --border: #2a2f3a;
  --text: #e6e8ee;
  --muted: #8b93a3;
  --accent: #4f8cff;
  --green: #3fb950;
  --red: #f85149;
  --radius: 10px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; }
.app-root { display: flex; flex-direction: column; height: 100vh; }
.app-header { display: flex; align-items: center; justify-content: space-between; padding: 12px 20px; border-bottom: 1px solid var(--border); }
.app-header h1 { font-size: 18px; font-weight: 600; }
.health .healthy { color: var(--green); }
.health .down { color: var(--red); }
.app-body { display: flex; flex: 1; min-height: 0; }
.sidebar { width: 260px; border-right: 1px solid var(--border); padding: 16px; overflow-y: auto; }
.sidebar-section { margin-bottom: 24px; }
.sidebar-section h3 { font-size: 13px; text-transform: uppercase; color: var(--muted); margin-bottom: 8px; }
.model-item { display: flex; align-items: center; justify-content: space-between; gap: 8px; padding: 6px 0; }
.model-name { font-family: var(--mono); overflow: hidden; text-overflow: ellipsis; }
.model-actions { display: flex; gap: 4px; }
.muted { color: var(--muted); font-size: 12px; margin-top: 6px; }
.app-main { flex: 1; display: flex; min-width: 0; }
.chat-window { flex: 1; display: flex; flex-direction: column; padding: 16px; min-width: 0; }
.messages { flex: 1; overflow-y: auto; display: flex; flex-direction: column; gap: 8px; padding-bottom: 8px; }
.bubble { max-width: 75%; padding: 8px 12px; border-radius: var(--radius); background: var(--surface); border: 1px solid var(--border); }
.bubble.user { align-self: flex-end; background: var(--accent); border-color: var(--accent); color: #fff; }
.bubble.assistant { align-self: flex-start; }
.bubble.pending { color: var(--muted); }
.bubble-text { white-space: pre-wrap; word-break: break-word; font-family: inherit; }
.composer { display: flex; gap: 8px; margin-top: 8px; }
.composer textarea { flex: 1; min-height: 48px; resize: vertical; padding: 10px; border-radius: var(--radius); background: var(--surface); color: var(--text); border: 1px solid var(--border); font-family: inherit; }
button { background: var(--surface); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: 6px 12px; cursor: pointer; }
button:hover { border-color: var(--accent); }
button:disabled { opacity: 0.5; cursor: not-allowed; }
#send-button { background: var(--accent); border-color: var(--accent); color: #fff; height: 100%; }
.footer-note { color: var(--muted); font-size: 12px; margin-top: 8px; }
code { font-family: var(--mono); }
";
