//! Transcript and composer.

use std::fmt::Write as _;

use crate::chat::{ChatWindow, Message};
use crate::ui::{escape, session_path};

/// Whole chat window: transcript, composer and the API base note.
pub fn window(session_id: &str, chat: &ChatWindow, api_base: &str) -> String {
    let path = session_path(session_id);
    let transcript = transcript(session_id, &chat.messages(), chat.is_loading());
    let button = send_button(chat.is_loading(), false);
    let api_base = escape(api_base);

    format!(
        r##"<div class="chat-window">
    {transcript}
    <form class="composer" hx-post="{path}/send" hx-target="#transcript" hx-swap="outerHTML"
          hx-disabled-elt="find button"
          hx-on::after-request="if (event.detail.successful) this.reset()">
        <textarea name="message" placeholder="Type a message..."
                  onkeydown="if (event.key === 'Enter' &amp;&amp; !event.shiftKey) {{ event.preventDefault(); if (!document.getElementById('send-button').disabled) this.form.requestSubmit(); }}"></textarea>
        <div class="composer-actions">{button}</div>
    </form>
    <div class="footer-note">API base: <code>{api_base}</code></div>
</div>"##
    )
}

/// Fragment returned after a send or a poll: the transcript plus the send
/// button, swapped out-of-band so it tracks the loading state.
pub fn transcript_update(session_id: &str, chat: &ChatWindow) -> String {
    let loading = chat.is_loading();
    format!(
        "{}\n{}",
        transcript(session_id, &chat.messages(), loading),
        send_button(loading, true)
    )
}

/// Transcript markup.
///
/// While a send is in flight it shows an ellipsis bubble and polls for the
/// reply. The newest message is scrolled into view whenever the message
/// count changes.
pub fn transcript(session_id: &str, messages: &[Message], loading: bool) -> String {
    let mut html = String::from(r#"<div id="transcript" class="messages""#);
    if loading {
        let _ = write!(
            html,
            r#" hx-get="{}/messages" hx-trigger="every 1s" hx-swap="outerHTML""#,
            session_path(session_id)
        );
    }
    html.push('>');

    for message in messages {
        let _ = write!(
            html,
            r#"<div class="bubble {}"><pre class="bubble-text">{}</pre></div>"#,
            message.role.as_str(),
            escape(&message.text)
        );
    }
    if loading {
        html.push_str(r#"<div class="bubble assistant pending">...</div>"#);
    }

    let _ = write!(
        html,
        r#"<div id="messages-end"></div><script>(function () {{ var n = {count}; if (window.__transcriptCount !== n) {{ window.__transcriptCount = n; document.getElementById('messages-end').scrollIntoView({{ behavior: 'smooth' }}); }} }})();</script></div>"#,
        count = messages.len()
    );
    html
}

/// The send control, disabled while a send is in flight.
pub fn send_button(loading: bool, out_of_band: bool) -> String {
    format!(
        r#"<button id="send-button" type="submit"{}{}>Send</button>"#,
        if loading { " disabled" } else { "" },
        if out_of_band { r#" hx-swap-oob="true""# } else { "" }
    )
}
