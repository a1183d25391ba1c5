//! Shared types for chatmark
//!
//! This crate provides the data shapes exchanged between the chat client and
//! the proxy: chat messages, conversation identifiers and the request/response
//! payloads of the `sendMessage` exchange.

use serde::{Deserialize, Serialize};

/// Opaque conversation identifier.
///
/// Assigned by the remote service on the first reply and carried by the client
/// on every later request. Never validated or interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        ConversationId(id)
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single chat message, owned by the client session.
///
/// Messages are created on send/receive and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub is_user: bool,
    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl Message {
    /// Message authored by the local user.
    pub fn user(id: impl Into<String>, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            is_user: true,
            timestamp: timestamp.into(),
        }
    }

    /// Message produced by the remote assistant (or substituted for it).
    pub fn assistant(
        id: impl Into<String>,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            is_user: false,
            timestamp: timestamp.into(),
        }
    }
}

/// Input of the `sendMessage` mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
}

/// Result of the `sendMessage` mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: String,
    pub message: String,
    pub timestamp: String,
    pub conversation_id: ConversationId,
}

impl ChatResponse {
    /// Convert the response into the reply message appended by the client.
    pub fn into_message(self) -> (Message, ConversationId) {
        let message = Message::assistant(self.id, self.message, self.timestamp);
        (message, self.conversation_id)
    }
}

/// Outcome of an upstream connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamCheck {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}
