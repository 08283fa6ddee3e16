use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use super::models::{Message, MessageId, Role, SessionSnapshot, Transcript};
use crate::api::public::{ChatRequest, ChatResponse};
use crate::api::{ChatBackend, ExchangeError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("session is busy with another message")]
    Busy,
}

struct SessionState {
    transcript: Transcript,
    busy: bool,
    last_error: Option<String>,
    // Bumped by `clear` so replies to exchanges started before the
    // clear can be recognized and dropped
    generation: u64,
    next_id: u64,
}

impl SessionState {
    fn next_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            history: self.transcript.messages(),
            busy: self.busy,
            last_error: self.last_error.clone(),
        }
    }
}

/// A conversation with the booking assistant.
///
/// Owns the message history, a busy flag that is set while an
/// exchange is in flight, and the diagnostic of the last failed
/// exchange. Failed exchanges never surface as errors from `submit`;
/// they become an assistant message explaining what went wrong so
/// every user turn gets a visible reply.
///
/// State lives behind a mutex that is never held across an await, so
/// a session can be shared between tasks. Views bind to it through
/// `subscribe`.
///
/// Use `SessionBuilder::new(backend)` to construct a session.
pub struct ConversationSession {
    id: String,
    backend: Arc<dyn ChatBackend>,
    state: Mutex<SessionState>,
    updates: watch::Sender<SessionSnapshot>,
}

impl ConversationSession {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> Vec<Message> {
        self.lock().transcript.messages()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Receive a fresh snapshot after every change to the session.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Runs one turn of the conversation: records the user message,
    /// sends it with the history that preceded it and records the
    /// assistant's reply or a diagnostic in its place. Returns the
    /// assistant message produced by the turn.
    ///
    /// Text is expected to be trimmed by the caller. Submitting blank
    /// text or submitting while another turn is in flight is rejected
    /// without touching the history.
    pub async fn submit(&self, text: &str) -> Result<Message, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let (request, generation) = {
            let mut state = self.lock();
            if state.busy {
                return Err(SessionError::Busy);
            }

            // Taken before the new message is appended since the
            // utterance travels separately in `message`
            let conversation_history = state.transcript.history_entries();
            let id = state.next_id();
            state.transcript.push(Message::new(id, Role::User, text));
            state.busy = true;
            state.last_error = None;
            self.publish(&state);

            let request = ChatRequest {
                message: text.to_string(),
                conversation_history,
            };
            (request, state.generation)
        };
        // Clears `busy` however this future ends, including when it is
        // dropped mid-exchange
        let _guard = BusyGuard { session: self };

        tracing::debug!(
            "Session {} sending message with {} prior entries",
            self.id,
            request.conversation_history.len()
        );
        let outcome = self
            .backend
            .exchange(&request)
            .await
            .and_then(ChatResponse::into_reply);

        let mut state = self.lock();
        let id = state.next_id();
        let (reply, failure) = match outcome {
            Ok(content) => (Message::new(id, Role::Assistant, &content), None),
            Err(err) => {
                tracing::warn!(
                    "Session {} exchange failed ({:?}): {}",
                    self.id,
                    err.kind(),
                    err
                );
                let diagnostic = err.diagnostic();
                (Message::new(id, Role::Assistant, &diagnostic), Some(diagnostic))
            }
        };
        if state.generation == generation {
            state.transcript.push(reply.clone());
            state.last_error = failure;
        } else {
            tracing::debug!(
                "Session {} was cleared during the exchange, dropping reply {}",
                self.id,
                id
            );
        }

        Ok(reply)
    }

    /// Empties the history and forgets the last error. An exchange
    /// still in flight completes but its reply is not recorded.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.transcript.clear();
        state.last_error = None;
        state.generation += 1;
        self.publish(&state);
    }

    /// Whether the backend is up. Failures only show up as `false`.
    pub async fn check_liveness(&self) -> bool {
        match self.backend.health().await {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("Liveness check failed: {}", err);
                false
            }
        }
    }

    /// Metadata about the backend service. Unlike the other
    /// operations this propagates failures to the caller.
    pub async fn describe_service(&self) -> Result<Value, ExchangeError> {
        self.backend.describe().await
    }

    // Recovers a poisoned lock, same as `BusyGuard::drop`
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) {
        self.updates.send_replace(state.snapshot());
    }
}

struct BusyGuard<'a> {
    session: &'a ConversationSession,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        state.busy = false;
        self.session.publish(&state);
    }
}

pub struct SessionBuilder {
    backend: Arc<dyn ChatBackend>,
    messages: Vec<Message>,
}

impl SessionBuilder {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            messages: Vec::new(),
        }
    }

    /// Start from an existing history instead of an empty one. The
    /// messages are renumbered by the session so their ids are unique.
    pub fn transcript(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn build(self) -> ConversationSession {
        let mut state = SessionState {
            transcript: Transcript::new(),
            busy: false,
            last_error: None,
            generation: 0,
            next_id: 0,
        };
        for mut msg in self.messages {
            msg.id = state.next_id();
            state.transcript.push(msg);
        }
        let (updates, _) = watch::channel(state.snapshot());

        ConversationSession {
            id: Uuid::new_v4().to_string(),
            backend: self.backend,
            state: Mutex::new(state),
            updates,
        }
    }
}
