//! Chat session: transcript, submit phase and view notifications.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use relaychat_chat::{Message, Role, CLIENT_ERROR_MESSAGE};

use crate::decode::Utf8Decoder;
use crate::relay::RelayClient;

/// Notification sent to the view layer. Views scroll to the newest message
/// after every append or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    MessageAppended(Message),
    MessageUpdated {
        id: u64,
        fragment: String,
        text: String,
    },
    InputEnabled(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, or an exchange was already in flight.
    Ignored,
    /// The response stream ended (normally or cut short).
    Completed,
    /// The relay could not be reached or answered with an error status.
    Failed,
}

struct SessionState {
    messages: Vec<Message>,
    phase: Phase,
    next_id: u64,
}

struct Inner {
    relay: RelayClient,
    state: Mutex<SessionState>,
    events: mpsc::UnboundedSender<ChatEvent>,
}

impl Inner {
    fn emit(&self, event: ChatEvent) {
        // A closed view is not an error for the session.
        let _ = self.events.send(event);
    }

    fn append(&self, role: Role, text: &str) -> u64 {
        let message = {
            let mut state = self.state.lock();
            let id = state.next_id;
            state.next_id += 1;
            let message = Message {
                id,
                text: text.to_string(),
                role,
            };
            state.messages.push(message.clone());
            message
        };
        let id = message.id;
        self.emit(ChatEvent::MessageAppended(message));
        id
    }

    fn extend(&self, id: u64, fragment: String) {
        let text = {
            let mut state = self.state.lock();
            let Some(message) = state.messages.iter_mut().find(|m| m.id == id) else {
                return;
            };
            message.text.push_str(&fragment);
            message.text.clone()
        };
        self.emit(ChatEvent::MessageUpdated { id, fragment, text });
    }
}

/// Returns the session to idle when dropped, including when the submit
/// future itself is dropped mid-exchange.
struct SubmitGuard<'a> {
    inner: &'a Inner,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.inner.state.lock().phase = Phase::Idle;
        self.inner.emit(ChatEvent::InputEnabled(true));
    }
}

/// Ordered chat transcript with at most one exchange in flight.
///
/// Cloning is cheap and every clone shares the same transcript.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<Inner>,
}

impl ChatSession {
    /// Create a session and the event receiver for its view.
    pub fn new(relay: RelayClient) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            inner: Arc::new(Inner {
                relay,
                state: Mutex::new(SessionState {
                    messages: Vec::new(),
                    phase: Phase::Idle,
                    next_id: 1,
                }),
                events: tx,
            }),
        };
        (session, rx)
    }

    /// Snapshot of the transcript in insertion order.
    pub fn messages(&self) -> Vec<Message> {
        self.inner.state.lock().messages.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().phase
    }

    pub fn is_input_enabled(&self) -> bool {
        self.phase() == Phase::Idle
    }

    /// Run one exchange for `input`.
    ///
    /// Blank input and submits during an exchange are no-ops. Input is
    /// re-enabled when this returns, whatever the outcome.
    pub async fn submit(&self, input: &str) -> SubmitOutcome {
        if input.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        {
            let mut state = self.inner.state.lock();
            if state.phase == Phase::Submitting {
                debug!("Submit ignored: exchange already in flight");
                return SubmitOutcome::Ignored;
            }
            state.phase = Phase::Submitting;
        }
        let _guard = SubmitGuard { inner: &self.inner };

        self.inner.append(Role::User, input);
        self.inner.emit(ChatEvent::InputEnabled(false));

        self.exchange(input).await
    }

    async fn exchange(&self, prompt: &str) -> SubmitOutcome {
        let response = match self.inner.relay.send(prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Chat request failed: {}", e);
                self.inner.append(Role::Assistant, CLIENT_ERROR_MESSAGE);
                return SubmitOutcome::Failed;
            }
        };

        let id = self.inner.append(Role::Assistant, "");
        let mut decoder = Utf8Decoder::new();
        let mut chunks = response.bytes_stream();

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    let text = decoder.decode(&bytes);
                    if !text.is_empty() {
                        self.inner.extend(id, text);
                    }
                }
                Err(e) => {
                    // A cut-off body still counts as the end of the reply.
                    warn!("Response stream ended early: {}", e);
                    break;
                }
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            self.inner.extend(id, tail);
        }

        SubmitOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_session() -> (ChatSession, mpsc::UnboundedReceiver<ChatEvent>) {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        ChatSession::new(RelayClient::with_client(client, "http://127.0.0.1:1"))
    }

    #[tokio::test]
    async fn test_blank_input_ignored() {
        let (session, mut events) = unreachable_session();

        for input in ["", "   ", "\n\t"] {
            assert_eq!(session.submit(input).await, SubmitOutcome::Ignored);
        }
        assert!(session.messages().is_empty());
        assert!(events.try_recv().is_err());
        assert!(session.is_input_enabled());
    }

    #[tokio::test]
    async fn test_unreachable_relay_appends_error() {
        let (session, mut events) = unreachable_session();

        assert_eq!(session.submit("Hello").await, SubmitOutcome::Failed);

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::user(1, "Hello"));
        assert_eq!(messages[1], Message::assistant(2, CLIENT_ERROR_MESSAGE));
        assert_eq!(session.phase(), Phase::Idle);

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }
        assert_eq!(
            received,
            vec![
                ChatEvent::MessageAppended(Message::user(1, "Hello")),
                ChatEvent::InputEnabled(false),
                ChatEvent::MessageAppended(Message::assistant(2, CLIENT_ERROR_MESSAGE)),
                ChatEvent::InputEnabled(true),
            ]
        );
    }

    #[tokio::test]
    async fn test_dropped_view_tolerated() {
        let (session, events) = unreachable_session();
        drop(events);
        assert_eq!(session.submit("Hello").await, SubmitOutcome::Failed);
        assert_eq!(session.messages().len(), 2);
    }
}
