//! End-to-end conversion: read the source, strip diagrams, render, wrap in
//! the document shell and write the result.

use std::{path::PathBuf, sync::Arc, time::Instant};

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::application::{
    diagrams::DiagramStripper,
    error::AppError,
    render::{ExtensionSet, RenderError, RenderRequest, RenderService},
};
use crate::config::{DocumentSettings, PathSettings, Settings};
use crate::infra::documents;
use crate::presentation::document::{CoverView, DocumentView, render_document};

/// In-memory result of converting a Markdown string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    pub html: String,
    pub diagrams_stripped: usize,
    pub headings: usize,
}

/// What the writer reports after a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub bytes_written: u64,
    pub diagrams_stripped: usize,
    pub headings: usize,
}

pub struct DocumentConverter {
    renderer: Arc<dyn RenderService>,
    stripper: DiagramStripper,
    document: DocumentSettings,
    extensions: ExtensionSet,
}

impl DocumentConverter {
    pub fn new(renderer: Arc<dyn RenderService>, settings: &Settings) -> Self {
        Self {
            renderer,
            stripper: DiagramStripper::new(&settings.diagrams.languages, &settings.diagrams.link),
            document: settings.document.clone(),
            extensions: settings.render,
        }
    }

    /// Turn Markdown into a complete HTML document stamped with `now`.
    pub fn convert_markdown(
        &self,
        markdown: &str,
        now: OffsetDateTime,
    ) -> Result<ConvertedDocument, AppError> {
        let started_at = Instant::now();
        let stripped = self.stripper.strip(markdown);

        let request =
            RenderRequest::new(stripped.markdown).with_extensions(self.extensions);
        let rendered = self.renderer.render(&request)?;

        let toc_html = if self.document.include_toc {
            rendered.toc_html.as_deref()
        } else {
            None
        };

        let html = render_document(DocumentView {
            lang: &self.document.lang,
            title: &self.document.title,
            cover: CoverView::new(&self.document, now)?,
            toc_html,
            body_html: &rendered.html,
        })
        .map_err(RenderError::from)?;

        debug!(
            target = "application::convert",
            op = "convert::convert_markdown",
            diagrams_stripped = stripped.stripped,
            unterminated_diagram = stripped.unterminated,
            headings = rendered.headings.len(),
            contains_code = rendered.contains_code,
            html_bytes = html.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Document converted"
        );

        Ok(ConvertedDocument {
            html,
            diagrams_stripped: stripped.stripped,
            headings: rendered.headings.len(),
        })
    }

    /// Convert the configured source file and write the configured output.
    /// Nothing is written unless every stage succeeds.
    pub fn convert_file(
        &self,
        paths: &PathSettings,
        now: OffsetDateTime,
    ) -> Result<ConversionReport, AppError> {
        let started_at = Instant::now();
        let source_path = paths.source_path();
        let output_path = paths.output_path();

        let markdown = documents::read_source(&source_path)?;
        let converted = self.convert_markdown(&markdown, now)?;
        let bytes_written = documents::write_output(&output_path, &converted.html)?;

        info!(
            target = "application::convert",
            op = "convert::convert_file",
            source = %source_path.display(),
            output = %output_path.display(),
            bytes = bytes_written,
            diagrams_stripped = converted.diagrams_stripped,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Conversion finished"
        );

        Ok(ConversionReport {
            source_path,
            output_path,
            bytes_written,
            diagrams_stripped: converted.diagrams_stripped,
            headings: converted.headings,
        })
    }
}
