//! Markdown-to-safe-HTML pipeline.
//!
//! Rendering runs in three stages: the block scanner splits the input into
//! block constructs and plain text runs, the inline scanner classifies spans
//! inside each line (protected spans first, then emphasis), and the formatter
//! writes the token tree through the allow-listed [`html::HtmlWriter`].

pub mod assembler;
pub mod autolink;
pub mod blocks;
pub mod format;
pub mod html;
pub mod inline;
pub mod rules;

#[cfg(test)]
mod test_integration;

use crate::config::RenderConfig;
use blocks::BlockScanner;
use format::Formatter;

pub use html::{escape_code, escape_text, SafeUrl};
pub use rules::{Rule, RuleSet};

/// Renders chat message text to an HTML fragment.
///
/// The renderer holds no mutable state and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `text` to HTML. Blank input renders to the empty string.
    pub fn render(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        let text = text.replace("\r\n", "\n");

        let blocks = BlockScanner::new(self.config.rules().block_rules()).scan(&text);
        tracing::trace!(blocks = blocks.len(), "scanned blocks");

        let html = Formatter::new(&self.config).format(&blocks);
        tracing::debug!(
            input_len = text.len(),
            output_len = html.len(),
            preset = ?self.config.preset(),
            "rendered message"
        );
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn renderer_is_shareable() {
        assert_send_sync::<Renderer>();
    }

    #[test]
    fn blank_input_renders_nothing() {
        let renderer = Renderer::default();
        assert_eq!(renderer.render(""), "");
        assert_eq!(renderer.render(" \n\t\n"), "");
    }

    #[test]
    fn crlf_is_normalised() {
        let renderer = Renderer::new(RenderConfig::compact());
        assert_eq!(renderer.render("a\r\nb"), "<p>a<br>b</p>");
    }
}
