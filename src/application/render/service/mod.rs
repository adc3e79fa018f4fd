mod config;
mod highlight;
mod rewrite;
mod toc;

use std::{sync::Arc, time::Instant};

use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use once_cell::sync::Lazy;
use syntect::{dumps::from_uncompressed_data, html::ClassStyle, parsing::SyntaxSet};
use tracing::debug;

use crate::application::render::types::{
    RenderError, RenderOutput, RenderRequest, RenderService,
};

use config::options_for;
use rewrite::{RewriteContext, RewriteOutcome, rewrite_ast};

/// Stylesheet for the `syntax-` prefixed classes emitted by the highlighter.
pub const SYNTAX_THEME_CSS: &str = include_str!(env!("SYNTAX_THEME_CSS_FILE"));

/// Default Comrak-based rendering pipeline with Syntect highlighting.
pub struct ComrakRenderService {
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
}

impl ComrakRenderService {
    /// Construct a renderer whose highlighter emits `syntax-` prefixed CSS
    /// classes. Markdown options are derived per request.
    fn new() -> Self {
        Self {
            syntax_set: load_syntax_set(),
            class_style: ClassStyle::SpacedPrefixed { prefix: "syntax-" },
        }
    }
}

pub(crate) fn load_syntax_set() -> SyntaxSet {
    let syntax_bytes = include_bytes!(env!("SYNTAX_PACK_FILE"));
    from_uncompressed_data(syntax_bytes).expect("syntax pack must be valid")
}

static RENDER_SERVICE: Lazy<Arc<ComrakRenderService>> =
    Lazy::new(|| Arc::new(ComrakRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ComrakRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl Default for ComrakRenderService {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for ComrakRenderService {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
        let started_at = Instant::now();
        let options = options_for(&request.extensions);
        let arena = Arena::new();
        let root = parse_document(&arena, &request.markdown, &options);

        let context = RewriteContext {
            options: &options,
            syntax_set: &self.syntax_set,
            class_style: &self.class_style,
            extensions: request.extensions,
        };
        let RewriteOutcome {
            contains_code,
            headings,
            toc_html,
        } = rewrite_stage(root, &context)?;

        let html = render_html_stage(root, &options)?;

        debug!(
            target = "application::render::service",
            headings = headings.len(),
            contains_code,
            html_bytes = html.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Markdown rendered"
        );

        Ok(RenderOutput {
            html,
            toc_html,
            headings,
            contains_code,
        })
    }
}

fn rewrite_stage<'a>(
    root: &'a AstNode<'a>,
    context: &RewriteContext<'_>,
) -> Result<RewriteOutcome, RenderError> {
    rewrite_ast(root, context)
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
        message: err.to_string(),
    })?;
    Ok(html)
}
