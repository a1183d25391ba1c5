use std::path::Path;

use anyhow::Result;
use chatmark_core::{RenderConfig, Renderer, DEMO_CONTENT};

use super::emit;

/// Render the built-in sample message.
pub fn demo(config: RenderConfig, page: bool, source: bool, output: Option<&Path>) -> Result<()> {
    if source {
        return emit(DEMO_CONTENT, output);
    }
    let renderer = Renderer::new(config);
    let html = if page {
        chatmark_render::render_page(&renderer, "Markdown rendering demo", DEMO_CONTENT)?
    } else {
        renderer.render(DEMO_CONTENT)
    };
    emit(&html, output)
}
