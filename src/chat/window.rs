//! The chat window: transcript, compose text and reply watcher.

use std::future::Future;
use std::sync::{Arc, RwLock};

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use super::Message;
use crate::api::{ChatApi, ChatOutcome, ChatRequest};

/// One page's chat window.
///
/// The transcript is append-only. User turns are appended by [`on_send`]
/// before the request goes out; assistant turns are appended by a watcher
/// task that follows the chat handle's last-response slot, so replies land in
/// the order they resolve.
///
/// Cloning shares the same window. The watcher stops when [`close`] is
/// called or the last clone is dropped.
///
/// [`on_send`]: ChatWindow::on_send
/// [`close`]: ChatWindow::close
#[derive(Debug, Clone)]
pub struct ChatWindow {
    inner: Arc<WindowInner>,
}

#[derive(Debug)]
struct WindowInner {
    api: ChatApi,
    model: String,
    transcript: Arc<watch::Sender<Vec<Message>>>,
    input: RwLock<String>,
    cancel: CancellationToken,
}

impl Drop for WindowInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl ChatWindow {
    /// Mount a window that sends with `model`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(api: ChatApi, model: impl Into<String>) -> Self {
        let (transcript, _) = watch::channel(Vec::new());
        let transcript = Arc::new(transcript);
        let cancel = CancellationToken::new();

        spawn_reply_watcher(api.subscribe(), Arc::clone(&transcript), cancel.clone());

        Self {
            inner: Arc::new(WindowInner {
                api,
                model: model.into(),
                transcript,
                input: RwLock::new(String::new()),
                cancel,
            }),
        }
    }

    /// Snapshot of the transcript in display order.
    pub fn messages(&self) -> Vec<Message> {
        self.inner.transcript.borrow().clone()
    }

    pub fn message_count(&self) -> usize {
        self.inner.transcript.borrow().len()
    }

    /// Receiver notified on every transcript change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Message>> {
        self.inner.transcript.subscribe()
    }

    /// Current compose text.
    pub fn input(&self) -> String {
        self.inner.input.read().unwrap().clone()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        *self.inner.input.write().unwrap() = text.into();
    }

    /// Whether a send is in flight; the send control is disabled meanwhile.
    pub fn is_loading(&self) -> bool {
        self.inner.api.is_loading()
    }

    /// Send the compose text.
    ///
    /// Returns `None` without touching any state when the trimmed input is
    /// empty. Otherwise the trimmed text is appended as a user message, the
    /// input is cleared and the send is dispatched; the returned future
    /// resolves when the backend call does.
    pub fn on_send(&self) -> Option<impl Future<Output = ChatOutcome> + Send + 'static> {
        let text = {
            let mut input = self.inner.input.write().unwrap();
            let text = input.trim().to_string();
            if text.is_empty() {
                return None;
            }
            input.clear();
            text
        };

        self.inner
            .transcript
            .send_modify(|messages| messages.push(Message::user(text.clone())));

        let request = ChatRequest::new(text).with_model(self.inner.model.clone());
        Some(self.inner.api.send_message(request))
    }

    /// Set the compose text and send it.
    pub fn submit(
        &self,
        text: impl Into<String>,
    ) -> Option<impl Future<Output = ChatOutcome> + Send + 'static> {
        self.set_input(text);
        self.on_send()
    }

    /// Stop following replies. Sends already in flight still resolve but are
    /// no longer appended.
    pub fn close(&self) {
        self.inner.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}

fn spawn_reply_watcher(
    mut replies: broadcast::Receiver<String>,
    transcript: Arc<watch::Sender<Vec<Message>>>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            let reply = tokio::select! {
                () = cancel.cancelled() => break,
                reply = replies.recv() => reply,
            };
            match reply {
                Ok(text) => {
                    transcript.send_modify(|messages| messages.push(Message::assistant(text)));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(name: "chat.replies.lagged", skipped, "Dropped chat replies");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
