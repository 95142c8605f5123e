//! Server-rendered HTML for the page and its htmx fragments.
//!
//! # Structure
//!
//! - [`layout`]: full page shell (root composition)
//! - [`health`]: health indicator
//! - [`sidebar`]: model management and history controls
//! - [`chat`]: transcript and composer

pub mod chat;
pub mod health;
pub mod layout;
pub mod sidebar;

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Base path of a page session's fragment routes.
pub(crate) fn session_path(session_id: &str) -> String {
    format!("/ui/sessions/{}", escape(session_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain text"), "plain text");
    }
}
