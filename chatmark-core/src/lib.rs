//! # chatmark-core
//!
//! Core library for chatmark: turns the lightweight markdown found in chat
//! messages into an escaped, allow-listed HTML fragment.
//!
//! ```
//! use chatmark_core::{RenderConfig, Renderer};
//!
//! let renderer = Renderer::new(RenderConfig::compact());
//! assert_eq!(renderer.render("**hi**"), "<p><strong>hi</strong></p>");
//! ```

pub mod config;
pub mod demo;
pub mod markdown;

pub use config::{ConfigError, Preset, RenderConfig, StyleSheet};
pub use demo::DEMO_CONTENT;
pub use markdown::autolink::AutolinkOptions;
pub use markdown::{escape_text, Renderer, Rule, RuleSet};
