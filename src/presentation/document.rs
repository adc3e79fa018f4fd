use askama::{Error as AskamaError, Template};
use thiserror::Error;
use time::{OffsetDateTime, macros::format_description};

use crate::application::render::{RenderError, SYNTAX_THEME_CSS};
use crate::config::DocumentSettings;
use crate::domain::markup::escape_text;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for RenderError {
    fn from(err: TemplateRenderError) -> Self {
        RenderError::Template {
            message: format!("{} ({}): {}", err.public_message, err.source, err.error),
        }
    }
}

/// Data shown on the cover page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverView {
    pub title: String,
    /// Escaped subtitle lines with `**…**` spans turned into `<strong>`.
    pub subtitles: Vec<String>,
    pub author: String,
    /// Generation date, e.g. `October 2026`.
    pub generated_on: String,
}

impl CoverView {
    pub fn new(settings: &DocumentSettings, now: OffsetDateTime) -> Result<Self, RenderError> {
        Ok(Self {
            title: settings.cover_title.clone(),
            subtitles: settings.subtitles.iter().map(|line| subtitle_html(line)).collect(),
            author: settings.author.clone(),
            generated_on: format_generated_on(now)?,
        })
    }
}

/// Escape a subtitle, rendering paired `**` markers as bold. An unpaired
/// marker is kept as text.
pub fn subtitle_html(text: &str) -> String {
    let segments: Vec<&str> = text.split("**").collect();
    let mut html = String::with_capacity(text.len());

    for (index, segment) in segments.iter().enumerate() {
        let escaped = escape_text(segment);
        if index % 2 == 0 {
            html.push_str(&escaped);
        } else if index + 1 < segments.len() {
            html.push_str("<strong>");
            html.push_str(&escaped);
            html.push_str("</strong>");
        } else {
            html.push_str("**");
            html.push_str(&escaped);
        }
    }
    html
}

pub fn format_generated_on(now: OffsetDateTime) -> Result<String, RenderError> {
    now.format(format_description!("[month repr:long] [year]"))
        .map_err(|err| RenderError::Template {
            message: format!("failed to format generation date: {err}"),
        })
}

pub struct DocumentView<'a> {
    pub lang: &'a str,
    pub title: &'a str,
    pub cover: CoverView,
    /// Table of contents placed right after the cover, when requested.
    pub toc_html: Option<&'a str>,
    pub body_html: &'a str,
}

#[derive(Template)]
#[template(path = "document.html")]
struct DocumentTemplate<'a> {
    view: DocumentView<'a>,
    syntax_css: &'static str,
}

/// Embed a rendered fragment in the styled, print-ready document shell.
pub fn render_document(view: DocumentView<'_>) -> Result<String, TemplateRenderError> {
    DocumentTemplate {
        view,
        syntax_css: SYNTAX_THEME_CSS,
    }
    .render()
    .map_err(|err| {
        TemplateRenderError::new(
            "presentation::document::render_document",
            "Document template rendering failed",
            err,
        )
    })
}
