//! Public API types exchanged with the backend

use serde::{Deserialize, Serialize};

use super::ExchangeError;
use crate::chat::models::Role;

/// Value of the `status` field marking a valid reply.
pub const STATUS_SUCCESS: &str = "success";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Body of the message-exchange request. The new user utterance
/// travels in `message` and is not repeated in
/// `conversation_history`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Vec<HistoryEntry>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    pub status: String,
}

impl ChatResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Extract the reply text, treating anything other than a
    /// successful status with a reply as a failed exchange.
    pub fn into_reply(self) -> Result<String, ExchangeError> {
        if !self.is_success() {
            return Err(ExchangeError::UnexpectedStatus(self.status));
        }
        self.response.ok_or_else(|| {
            ExchangeError::Malformed(String::from("successful status without a response"))
        })
    }
}
