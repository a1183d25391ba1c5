//! # chatmark-render
//!
//! Template rendering library for chatmark.
//!
//! Wraps rendered message fragments in standalone HTML documents using
//! Askama: a single-document page (used by `chatmark demo` and `chatmark
//! render --page`) and a chat transcript.

pub mod templates;

pub use templates::{
    render_page, render_transcript, PageTemplate, RenderError, TranscriptEntry,
    TranscriptTemplate,
};
