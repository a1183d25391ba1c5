//! Askama template definitions.

use askama::Template;
use chatmark_core::Renderer;
use chatmark_types::{ConversationId, Message};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to render template: {0}")]
    Template(#[from] askama::Error),
}

/// Standalone page around one rendered document
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub title: String,
    /// Pre-rendered, already escaped fragment
    pub content: String,
    pub year: i32,
}

/// One message of a transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub author: String,
    pub is_user: bool,
    /// Short display time ("14:05"), or the raw timestamp if unparseable
    pub time: String,
    pub html: String,
}

#[derive(Template)]
#[template(path = "transcript.html")]
pub struct TranscriptTemplate {
    pub title: String,
    pub conversation_id: Option<String>,
    pub entries: Vec<TranscriptEntry>,
    pub year: i32,
}

fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year()
}

fn display_time(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Render `markdown` and wrap it in a page.
pub fn render_page(renderer: &Renderer, title: &str, markdown: &str) -> Result<String, RenderError> {
    Ok(page(renderer, title, markdown, current_year()).render()?)
}

fn page(renderer: &Renderer, title: &str, markdown: &str, year: i32) -> PageTemplate {
    PageTemplate {
        title: title.to_string(),
        content: renderer.render(markdown),
        year,
    }
}

/// Render a conversation. User messages are shown as plain escaped text,
/// assistant messages go through the markdown renderer.
pub fn render_transcript(
    renderer: &Renderer,
    messages: &[Message],
    conversation_id: Option<&ConversationId>,
) -> Result<String, RenderError> {
    Ok(transcript(renderer, messages, conversation_id, current_year()).render()?)
}

fn transcript(
    renderer: &Renderer,
    messages: &[Message],
    conversation_id: Option<&ConversationId>,
    year: i32,
) -> TranscriptTemplate {
    let entries = messages
        .iter()
        .map(|message| TranscriptEntry {
            author: if message.is_user { "You" } else { "Assistant" }.to_string(),
            is_user: message.is_user,
            time: display_time(&message.timestamp),
            html: if message.is_user {
                chatmark_core::escape_text(&message.content)
            } else {
                renderer.render(&message.content)
            },
        })
        .collect();

    TranscriptTemplate {
        title: "Conversation".to_string(),
        conversation_id: conversation_id.map(|id| id.to_string()),
        entries,
        year,
    }
}
