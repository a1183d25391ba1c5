use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chatmark_core::{RenderConfig, Renderer};

use super::emit;

pub struct RenderOptions {
    pub page: bool,
    pub title: String,
    pub output: Option<PathBuf>,
}

/// Render a file (or stdin) to an HTML fragment or page.
pub fn render_input(config: RenderConfig, input: Option<&Path>, opts: RenderOptions) -> Result<()> {
    let source = match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let renderer = Renderer::new(config);
    let html = if opts.page {
        chatmark_render::render_page(&renderer, &opts.title, &source)?
    } else {
        renderer.render(&source)
    };
    emit(&html, opts.output.as_deref())
}
