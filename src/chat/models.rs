//! The core models for a conversation with the booking assistant.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::public::HistoryEntry;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Identifies a message within a single session. Ids come from a
/// per-session counter so two messages created in the same instant
/// still get different ids.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: MessageId, role: Role, content: &str) -> Self {
        Message {
            id,
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// The wire form of this message. Ids and timestamps are display
    /// only and never leave the client.
    pub fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.0.clone()
    }

    pub fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.0.iter().map(Message::to_history_entry).collect()
    }
}

/// Point-in-time view of a session, published to subscribers after
/// every state change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub history: Vec<Message>,
    pub busy: bool,
    pub last_error: Option<String>,
}
