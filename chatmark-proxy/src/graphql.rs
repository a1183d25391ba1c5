//! Minimal GraphQL-shaped dispatcher.
//!
//! There is no GraphQL parser here: operations are recognised by substring
//! matching on the query text, which is all the chat client needs.

use chatmark_types::{ChatResponse, ConversationId, SendMessageInput, UpstreamCheck};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::upstream::{CompletionBackend, UpstreamError};

pub const HELLO: &str = "Hello from chatmark proxy!";
pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";
const CHECK_PROMPT: &str = "Hello, this is a test message.";
const REPLY_MAX_TOKENS: u32 = 1000;
const CHECK_MAX_TOKENS: u32 = 50;

/// Request-shape failures. Every variant is reported as a 400 with
/// `{"errors": [{"message": ...}]}`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphqlError {
    #[error("Content-Type must be application/json")]
    UnsupportedContentType,

    #[error("Request body is empty")]
    EmptyBody,

    #[error("Invalid JSON in request body")]
    InvalidJson,

    #[error("GraphQL query is required")]
    MissingQuery,

    #[error("Message is required")]
    MessageRequired,

    #[error("Unsupported GraphQL operation")]
    Unsupported,
}

impl GraphqlError {
    pub fn to_body(&self) -> Value {
        json!({ "errors": [{ "message": self.to_string() }] })
    }
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(default)]
    query: Value,
    #[serde(default)]
    variables: Value,
}

/// A decoded request with a non-empty query.
#[derive(Debug)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn parse(body: &[u8]) -> Result<Self, GraphqlError> {
        if body.is_empty() {
            return Err(GraphqlError::EmptyBody);
        }
        let raw: RawRequest =
            serde_json::from_slice(body).map_err(|_| GraphqlError::InvalidJson)?;
        match raw.query {
            Value::String(query) if !query.is_empty() => Ok(Self {
                query,
                variables: raw.variables,
            }),
            _ => Err(GraphqlError::MissingQuery),
        }
    }
}

/// Run the request and return the `data` object.
pub async fn execute(
    request: &GraphqlRequest,
    backend: &dyn CompletionBackend,
) -> Result<Value, GraphqlError> {
    let query = request.query.as_str();

    if query.contains("hello") && query.contains("query") {
        return Ok(json!({ "hello": HELLO }));
    }
    if query.contains("testUpstream") && query.contains("query") {
        let result = check_upstream(backend).await;
        return Ok(json!({ "testUpstream": result }));
    }
    if query.contains("sendMessage") && query.contains("mutation") {
        let input = send_message_input(&request.variables)?;
        let response = send_message(backend, input).await;
        return Ok(json!({ "sendMessage": response }));
    }

    warn!(query, "unsupported operation");
    Err(GraphqlError::Unsupported)
}

fn send_message_input(variables: &Value) -> Result<SendMessageInput, GraphqlError> {
    let input = &variables["input"];
    let message = input["message"]
        .as_str()
        .filter(|m| !m.is_empty())
        .ok_or(GraphqlError::MessageRequired)?;
    let conversation_id = input["conversationId"]
        .as_str()
        .filter(|id| !id.is_empty())
        .map(ConversationId::new);
    Ok(SendMessageInput {
        message: message.to_string(),
        conversation_id,
    })
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// `sendMessage` resolver. Upstream failures become an `Error: ...` reply
/// rather than a request error.
pub async fn send_message(backend: &dyn CompletionBackend, input: SendMessageInput) -> ChatResponse {
    info!(len = input.message.len(), "processing message");

    let message = match backend.complete(&input.message, REPLY_MAX_TOKENS).await {
        Ok(completion) => completion
            .first_content()
            .unwrap_or(FALLBACK_REPLY)
            .to_string(),
        Err(err) => {
            warn!(error = %err, "sendMessage failed upstream");
            format!("Error: {err}")
        }
    };

    ChatResponse {
        id: new_id(),
        message,
        timestamp: now(),
        conversation_id: input
            .conversation_id
            .unwrap_or_else(|| ConversationId::new(new_id())),
    }
}

/// Connectivity check behind `testUpstream` and `GET /test-upstream`.
pub async fn check_upstream(backend: &dyn CompletionBackend) -> UpstreamCheck {
    match backend.complete(CHECK_PROMPT, CHECK_MAX_TOKENS).await {
        Ok(completion) => UpstreamCheck {
            success: true,
            message: "Upstream API connection successful".to_string(),
            details: Some(format!(
                "Received response with {} choices",
                completion.choices.len()
            )),
        },
        Err(UpstreamError::MissingApiKey) => UpstreamCheck {
            success: false,
            message: "Upstream API key is not configured".to_string(),
            details: Some("Set CHATMARK_API_KEY or pass --api-key".to_string()),
        },
        Err(UpstreamError::Status {
            status,
            reason,
            body,
        }) => UpstreamCheck {
            success: false,
            message: format!("Upstream API returned {status}: {reason}"),
            details: Some(body),
        },
        Err(err) => UpstreamCheck {
            success: false,
            message: format!("Connection error: {err}"),
            details: None,
        },
    }
}
