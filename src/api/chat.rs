//! Stateful chat handle: loading flag plus last-response slot.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use super::client::ApiClient;
use super::types::{ChatOutcome, ChatRequest};

/// Capacity of the reply announcement channel.
const REPLY_CHANNEL_CAPACITY: usize = 64;

/// Chat operations bound to one chat window.
///
/// Holds the loading flag and the last-response slot. Each completed send
/// overwrites the slot and announces the new text to every subscriber.
#[derive(Debug, Clone)]
pub struct ChatApi {
    client: ApiClient,
    in_flight: Arc<AtomicUsize>,
    last_response: Arc<RwLock<Option<String>>>,
    replies: broadcast::Sender<String>,
}

impl ChatApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        let (replies, _) = broadcast::channel(REPLY_CHANNEL_CAPACITY);
        Self {
            client,
            in_flight: Arc::new(AtomicUsize::new(0)),
            last_response: Arc::new(RwLock::new(None)),
            replies,
        }
    }

    /// Whether a send is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// The most recent reply text, error strings included.
    pub fn last_response(&self) -> Option<String> {
        self.last_response.read().unwrap().clone()
    }

    /// Receives every value written to the last-response slot from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.replies.subscribe()
    }

    /// Send a chat message.
    ///
    /// The loading flag is raised before this returns, so callers observe the
    /// in-flight state as soon as the send is dispatched. It drops again when
    /// the returned future completes or is dropped.
    pub fn send_message(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = ChatOutcome> + Send + 'static {
        let loading = LoadingGuard::engage(Arc::clone(&self.in_flight));
        let api = self.clone();

        async move {
            let _loading = loading;
            tracing::debug!(
                name: "chat.send.start",
                model = %request.model,
                stream = request.stream,
                message_length = request.message.len(),
                "Sending chat message"
            );

            let outcome = api.client.post_chat(&request).await;
            let text = outcome.display_text();

            *api.last_response.write().unwrap() = Some(text.clone());
            // No subscribers is fine: the slot still holds the value.
            let _ = api.replies.send(text);

            tracing::info!(
                name: "chat.send.done",
                ok = outcome.is_reply(),
                "Chat message resolved"
            );
            outcome
        }
    }
}

/// Keeps the loading flag raised while alive.
#[derive(Debug)]
struct LoadingGuard {
    counter: Arc<AtomicUsize>,
}

impl LoadingGuard {
    fn engage(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
