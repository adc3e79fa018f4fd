use thiserror::Error;

/// Optional Markdown features enabled for a rendering pass. Fenced code blocks
/// are part of CommonMark and always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionSet {
    /// Pipe tables with column alignment.
    pub tables: bool,
    /// Syntax highlighting of fenced code through syntect.
    pub highlight: bool,
    /// Replace a `[TOC]` paragraph with a nested list of heading links.
    pub table_of_contents: bool,
    /// `{: #id .class key=value }` annotations on headings, paragraphs and images.
    pub attribute_lists: bool,
    /// Pass raw HTML through verbatim; when off it is escaped and shown as text.
    pub raw_html: bool,
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self {
            tables: true,
            highlight: true,
            table_of_contents: true,
            attribute_lists: true,
            raw_html: true,
        }
    }
}

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Preprocessed markdown (diagram fences already replaced).
    pub markdown: String,
    pub extensions: ExtensionSet,
}

impl RenderRequest {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            extensions: ExtensionSet::default(),
        }
    }

    pub fn with_extensions(mut self, extensions: ExtensionSet) -> Self {
        self.extensions = extensions;
        self
    }
}

/// Heading discovered while rendering, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingInfo {
    pub level: u8,
    /// Anchor id assigned to the heading element.
    pub id: String,
    pub text: String,
}

/// Deterministic rendering result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    /// HTML fragment ready to be embedded in the document shell.
    pub html: String,
    /// Nested heading list, present whenever the document has headings and
    /// the table-of-contents extension is on.
    pub toc_html: Option<String>,
    pub headings: Vec<HeadingInfo>,
    /// Indicates whether the rendered HTML contains any code blocks.
    pub contains_code: bool,
}

/// Structured errors surfaced by the rendering pipeline.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("markdown rendering failed: {message}")]
    Markdown { message: String },
    #[error("syntax highlighting failed: {language}: {message}")]
    Highlighting { language: String, message: String },
    #[error("document template failed: {message}")]
    Template { message: String },
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: given the same input, they return identical outputs or errors.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError>;
}
