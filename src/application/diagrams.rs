//! Removal of diagram fences ahead of Markdown rendering.
//!
//! Diagrams cannot be drawn in a printed document, so every fence tagged with
//! a diagram language is swapped for a blockquote pointing readers at the
//! interactive source. Fences are located on the CommonMark block tree, keyed
//! on the language tag, so diagrams nested in quotes or list items are found
//! and ordinary code samples pass through untouched, even when they contain a
//! diagram fence themselves.

use comrak::{Arena, Options, nodes::NodeValue, parse_document};
use tracing::{debug, warn};

/// Languages whose fences are stripped when nothing else is configured.
pub const DEFAULT_DIAGRAM_LANGUAGES: &[&str] = &["mermaid"];

/// Result of a strip pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripOutcome {
    pub markdown: String,
    /// Number of diagram blocks replaced by a note.
    pub stripped: usize,
    /// Set when a diagram block had no closing fence and ran to the end of its container.
    pub unterminated: bool,
}

#[derive(Debug, Clone)]
pub struct DiagramStripper {
    languages: Vec<String>,
    note: String,
}

/// Source lines (1-based, inclusive) covered by one diagram fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DiagramSpan {
    first_line: usize,
    last_line: usize,
    /// Byte length of the container prefix (quote markers, list indent) on the opening line.
    prefix_len: usize,
    closed: bool,
}

impl DiagramStripper {
    /// `link` is the target of the note's "interactive version" link, usually
    /// the source document itself.
    pub fn new<I, S>(languages: I, link: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            languages: languages
                .into_iter()
                .map(|lang| lang.as_ref().trim().to_ascii_lowercase())
                .filter(|lang| !lang.is_empty())
                .collect(),
            note: diagram_note(link),
        }
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn strip(&self, markdown: &str) -> StripOutcome {
        let spans = self.find_diagrams(markdown);
        if spans.is_empty() {
            return StripOutcome {
                markdown: markdown.to_string(),
                stripped: 0,
                unterminated: false,
            };
        }

        let mut output = String::with_capacity(markdown.len());
        let mut pending = spans.iter().peekable();

        for (index, line) in markdown.split_inclusive('\n').enumerate() {
            let number = index + 1;
            let Some(span) = pending.peek().copied() else {
                output.push_str(line);
                continue;
            };

            if number < span.first_line {
                output.push_str(line);
                continue;
            }
            if number == span.first_line {
                let prefix = line.get(..span.prefix_len).unwrap_or("");
                self.push_note(&mut output, prefix);
            }
            if number >= span.last_line {
                pending.next();
            }
        }

        let unterminated = spans.iter().any(|span| !span.closed);
        if unterminated {
            warn!(
                target = "application::diagrams",
                "Diagram block is missing its closing fence; stripped to the end of its container"
            );
        }

        StripOutcome {
            markdown: output,
            stripped: spans.len(),
            unterminated,
        }
    }

    fn find_diagrams(&self, markdown: &str) -> Vec<DiagramSpan> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &Options::default());

        root.descendants()
            .filter_map(|node| {
                let data = node.data.borrow();
                let NodeValue::CodeBlock(block) = &data.value else {
                    return None;
                };
                let language = block.info.split_whitespace().next().unwrap_or("");
                if !block.fenced || !self.is_diagram(language) {
                    return None;
                }

                debug!(
                    target = "application::diagrams",
                    language,
                    line = data.sourcepos.start.line,
                    "Stripping diagram block"
                );
                let start = data.sourcepos.start;
                Some(DiagramSpan {
                    first_line: start.line,
                    last_line: data.sourcepos.end.line.max(start.line),
                    prefix_len: start.column.saturating_sub(1),
                    closed: block.closed,
                })
            })
            .collect()
    }

    fn is_diagram(&self, language: &str) -> bool {
        let language = language.to_ascii_lowercase();
        self.languages.iter().any(|candidate| *candidate == language)
    }

    /// Writes the note as its own blockquote inside the fence's container.
    /// `prefix` is the text before the opening fence on its line; list
    /// markers in it are kept on the note line only.
    fn push_note(&self, output: &mut String, prefix: &str) {
        let continuation = continuation_prefix(prefix);
        let blank = continuation.trim_end();

        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(blank);
        output.push('\n');
        output.push_str(prefix);
        output.push_str(&self.note);
        output.push('\n');
        output.push_str(blank);
        output.push('\n');
    }
}

/// Markdown blockquote that replaces a stripped diagram.
pub fn diagram_note(link: &str) -> String {
    format!("> **📊 Diagram:** See interactive version at [{link}]({link})")
}

/// Prefix for lines that continue the container of `prefix`: quote markers
/// and tabs stay, list markers become indentation.
fn continuation_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .map(|ch| match ch {
            '>' | '\t' => ch,
            _ => ' ',
        })
        .collect()
}
