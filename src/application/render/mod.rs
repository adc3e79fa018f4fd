//! Markdown rendering.
//!
//! The rendering pipeline is pure: it accepts preprocessed markdown, produces
//! deterministic HTML output and surfaces structured errors. Reading the source
//! and writing the document happen in the caller.

mod service;
mod types;

pub use service::{ComrakRenderService, SYNTAX_THEME_CSS, render_service};
pub use types::{
    ExtensionSet, HeadingInfo, RenderError, RenderOutput, RenderRequest, RenderService,
};
