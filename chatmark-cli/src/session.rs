//! Client-side chat session: message history, conversation id and the
//! exchange with the proxy.

use async_trait::async_trait;
use chatmark_types::{ChatResponse, ConversationId, Message, SendMessageInput};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

/// Shown in place of a reply when the exchange fails.
pub const APOLOGY: &str = "Sorry, something went wrong while sending your message. Please try again later.";

const SEND_MESSAGE_MUTATION: &str = "mutation SendMessage($input: MessageInput!) {
  sendMessage(input: $input) {
    id
    message
    timestamp
    conversationId
  }
}";

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("server reported: {0}")]
    Graphql(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// One request/response round trip with the remote service.
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn send(&self, input: &SendMessageInput) -> Result<ChatResponse, ExchangeError>;
}

/// Posts the `sendMessage` mutation to a proxy's `/graphql` endpoint.
pub struct GraphqlExchange {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphqlExchange {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    #[serde(default)]
    data: Option<SendMessageData>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageData {
    send_message: Option<ChatResponse>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

fn decode(status: u16, body: &str) -> Result<ChatResponse, ExchangeError> {
    let envelope: Result<GraphqlEnvelope, _> = serde_json::from_str(body);
    match envelope {
        Ok(envelope) if !envelope.errors.is_empty() => {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            Err(ExchangeError::Graphql(messages.join("; ")))
        }
        _ if !(200..300).contains(&status) => Err(ExchangeError::Status {
            status,
            body: body.to_string(),
        }),
        Ok(envelope) => envelope
            .data
            .and_then(|data| data.send_message)
            .ok_or_else(|| ExchangeError::Malformed("missing data.sendMessage".to_string())),
        Err(err) => Err(ExchangeError::Malformed(err.to_string())),
    }
}

#[async_trait]
impl Exchange for GraphqlExchange {
    async fn send(&self, input: &SendMessageInput) -> Result<ChatResponse, ExchangeError> {
        let payload = json!({
            "query": SEND_MESSAGE_MUTATION,
            "variables": { "input": input },
        });
        debug!(endpoint = %self.endpoint, "sending message");
        let resp = self.http.post(&self.endpoint).json(&payload).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        decode(status, &body)
    }
}

/// Chat state for one user. `send` takes `&mut self`, so a session never has
/// more than one request in flight.
pub struct ChatSession<E> {
    exchange: E,
    messages: Vec<Message>,
    conversation_id: Option<ConversationId>,
}

impl<E: Exchange> ChatSession<E> {
    pub fn new(exchange: E) -> Self {
        Self {
            exchange,
            messages: Vec::new(),
            conversation_id: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    /// Send `text` and append both sides of the exchange. Returns the
    /// appended reply (or apology), or `None` for blank input.
    pub async fn send(&mut self, text: &str) -> Option<&Message> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.messages.push(Message::user(new_id(), text, now()));
        let input = SendMessageInput {
            message: text.to_string(),
            conversation_id: self.conversation_id.clone(),
        };

        let reply = match self.exchange.send(&input).await {
            Ok(response) => {
                let (message, conversation_id) = response.into_message();
                if self.conversation_id.is_none() {
                    debug!(%conversation_id, "conversation started");
                    self.conversation_id = Some(conversation_id);
                }
                message
            }
            Err(err) => {
                warn!(error = %err, "message exchange failed");
                Message::assistant(new_id(), APOLOGY, now())
            }
        };
        self.messages.push(reply);
        self.messages.last()
    }

    /// Forget all messages and the conversation id.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.conversation_id = None;
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
