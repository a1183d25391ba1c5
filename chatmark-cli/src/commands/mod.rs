//! CLI command implementations.

pub mod chat;
pub mod demo;
pub mod render;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use chatmark_core::{Preset, RenderConfig};

use crate::PresetArg;

pub use chat::chat;
pub use demo::demo;
pub use render::{render_input, RenderOptions};
pub use serve::serve;

/// Build the renderer configuration from an optional file and preset flag.
///
/// A preset flag replaces the file's style classes but keeps its rule table,
/// default language and autolink options.
pub fn load_config(path: Option<&Path>, preset: Option<PresetArg>) -> Result<RenderConfig> {
    let config = match path {
        Some(path) => RenderConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RenderConfig::default(),
    };

    let Some(preset) = preset else {
        return Ok(config);
    };
    let preset = match preset {
        PresetArg::Rich => Preset::Rich,
        PresetArg::Compact => Preset::Compact,
    };
    let language = config.default_language().to_string();
    Ok(RenderConfig::from_preset(preset)
        .with_rules(config.rules().clone())
        .with_autolink(config.autolink().clone())
        .with_default_language(language))
}

/// Write to `output`, or stdout when absent.
pub(crate) fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{text}"),
    }
    Ok(())
}
