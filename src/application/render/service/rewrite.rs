use comrak::{
    format_html,
    nodes::{AstNode, NodeHtmlBlock, NodeValue},
    options::Options,
};
use syntect::html::ClassStyle;
use syntect::parsing::SyntaxSet;

use crate::application::render::types::{ExtensionSet, HeadingInfo, RenderError};
use crate::domain::{
    attributes::AttributeList,
    markup::{escape_attribute, escape_text},
    slug::AnchorSlugger,
};

use super::{highlight, toc};

#[derive(Debug, Default)]
pub(crate) struct RewriteOutcome {
    pub(crate) contains_code: bool,
    pub(crate) headings: Vec<HeadingInfo>,
    pub(crate) toc_html: Option<String>,
}

pub(crate) struct RewriteContext<'o> {
    pub(crate) options: &'o Options<'static>,
    pub(crate) syntax_set: &'o SyntaxSet,
    pub(crate) class_style: &'o ClassStyle,
    pub(crate) extensions: ExtensionSet,
}

/// Rewrite the parsed document in place: code blocks become highlighted HTML,
/// headings gain anchor ids, attribute lists are applied and `[TOC]` markers
/// are replaced by the heading list.
pub(crate) fn rewrite_ast<'a>(
    root: &'a AstNode<'a>,
    context: &RewriteContext<'_>,
) -> Result<RewriteOutcome, RenderError> {
    let mut walker = RewriteWalker::new(context);
    if context.extensions.attribute_lists {
        walker.reserve_explicit_ids(root);
    }
    walker.visit_nodes(root)?;
    walker.finish()
}

struct RewriteWalker<'a, 'o> {
    context: &'o RewriteContext<'o>,
    outcome: RewriteOutcome,
    slugger: AnchorSlugger,
    toc_markers: Vec<&'a AstNode<'a>>,
}

impl<'a, 'o> RewriteWalker<'a, 'o> {
    fn new(context: &'o RewriteContext<'o>) -> Self {
        Self {
            context,
            outcome: RewriteOutcome::default(),
            slugger: AnchorSlugger::new(),
            toc_markers: Vec::new(),
        }
    }

    /// Explicit heading ids anywhere in the document take precedence over
    /// generated anchors, including those of earlier headings.
    fn reserve_explicit_ids(&mut self, root: &'a AstNode<'a>) {
        for node in root.descendants() {
            if heading_level(node).is_none() {
                continue;
            }
            if let Some(id) = peek_trailing_id(node) {
                self.slugger.reserve(&id);
            }
        }
    }

    fn visit_nodes(&mut self, node: &'a AstNode<'a>) -> Result<(), RenderError> {
        if !self.context.extensions.raw_html {
            escape_raw_html(node);
        }

        if is_image(node) {
            self.rewrite_image(node);
        } else if let Some((info, literal)) = extract_code_block(node) {
            self.rewrite_code_block(node, &info, &literal)?;
        }

        let mut child = node.first_child();
        while let Some(next) = child {
            self.visit_nodes(next)?;
            child = next.next_sibling();
        }

        // Headings and paragraphs are serialised after their children have
        // been rewritten.
        if let Some(level) = heading_level(node) {
            self.rewrite_heading(node, level)?;
        } else if is_paragraph(node) {
            self.rewrite_paragraph(node)?;
        }

        Ok(())
    }

    fn finish(mut self) -> Result<RewriteOutcome, RenderError> {
        if self.context.extensions.table_of_contents {
            self.outcome.toc_html = toc::build_toc_html(&self.outcome.headings);
        }

        let toc_html = self
            .outcome
            .toc_html
            .clone()
            .unwrap_or_else(|| "<div class=\"toc\"></div>\n".to_string());
        for marker in self.toc_markers.drain(..) {
            replace_with_html_block(marker, toc_html.clone());
        }

        Ok(self.outcome)
    }

    fn rewrite_code_block(
        &mut self,
        node: &'a AstNode<'a>,
        info: &str,
        literal: &str,
    ) -> Result<(), RenderError> {
        let mut segments = info.split_whitespace();
        let language = segments.next();
        let meta = segments.collect::<Vec<_>>().join(" ");
        let meta = (!meta.is_empty()).then_some(meta.as_str());

        let html = if self.context.extensions.highlight {
            highlight::highlight_code(
                language,
                meta,
                literal,
                self.context.syntax_set,
                self.context.class_style,
            )?
        } else {
            highlight::plain_code_block(language, meta, literal)
        };

        self.outcome.contains_code = true;
        replace_with_html_block(node, html);
        Ok(())
    }

    fn rewrite_heading(&mut self, node: &'a AstNode<'a>, level: u8) -> Result<(), RenderError> {
        let mut attributes = if self.context.extensions.attribute_lists {
            take_trailing_attributes(node, false).unwrap_or_default()
        } else {
            AttributeList::default()
        };

        let text = normalize_whitespace(&collect_inline_text(node));
        let id = match attributes.id.clone() {
            Some(id) => id,
            None => self.slugger.anchor_for(&text),
        };
        attributes.id = Some(id.clone());

        let inner = render_children(node, self.context.options)?;
        let html = format!("<h{level}{}>{inner}</h{level}>\n", attributes.to_html());
        replace_with_html_block(node, html);

        self.outcome.headings.push(HeadingInfo { level, id, text });
        Ok(())
    }

    fn rewrite_paragraph(&mut self, node: &'a AstNode<'a>) -> Result<(), RenderError> {
        if self.context.extensions.table_of_contents
            && collect_inline_text(node).trim() == toc::TOC_MARKER
        {
            self.toc_markers.push(node);
            return Ok(());
        }

        if !self.context.extensions.attribute_lists {
            return Ok(());
        }

        let Some(attributes) = take_trailing_attributes(node, true) else {
            return Ok(());
        };

        let inner = render_children(node, self.context.options)?;
        let html = format!("<p{}>{inner}</p>\n", attributes.to_html());
        replace_with_html_block(node, html);
        Ok(())
    }

    fn rewrite_image(&mut self, node: &'a AstNode<'a>) {
        let (src, title) = {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Image(link) => (link.url.clone(), link.title.clone()),
                _ => return,
            }
        };

        let alt = normalize_whitespace(&collect_inline_text(node));
        let attributes = if self.context.extensions.attribute_lists {
            take_leading_attributes(node)
        } else {
            None
        };

        let html = build_image_html(
            &src,
            &alt,
            (!title.is_empty()).then_some(title.as_str()),
            attributes.as_ref(),
        );

        {
            let mut data = node.data.borrow_mut();
            data.value = NodeValue::HtmlInline(html);
        }

        while let Some(child) = node.first_child() {
            child.detach();
        }
    }
}

fn build_image_html(
    src: &str,
    alt: &str,
    title: Option<&str>,
    attributes: Option<&AttributeList>,
) -> String {
    let mut html = String::with_capacity(src.len() + alt.len() + 32);
    html.push_str("<img src=\"");
    html.push_str(&escape_attribute(src));
    html.push_str("\" alt=\"");
    html.push_str(&escape_attribute(alt));
    html.push('"');

    if let Some(title) = title {
        html.push_str(" title=\"");
        html.push_str(&escape_attribute(title));
        html.push('"');
    }

    if let Some(attributes) = attributes {
        html.push_str(&attributes.to_html());
    }

    html.push_str(" />");
    html
}

/// Escape author-supplied HTML so it shows up as text.
fn escape_raw_html(node: &AstNode<'_>) {
    let mut data = node.data.borrow_mut();
    match &mut data.value {
        NodeValue::HtmlBlock(block) => {
            block.literal = format!("<p>{}</p>\n", escape_text(block.literal.trim_end()));
        }
        NodeValue::HtmlInline(raw) => {
            *raw = escape_text(raw);
        }
        _ => {}
    }
}

/// Remove a `{: … }` list from the end of the node's last text child.
///
/// With `own_line` the list must sit alone on the final line (paragraphs);
/// otherwise it may trail the text on the same line (headings).
fn take_trailing_attributes<'a>(node: &'a AstNode<'a>, own_line: bool) -> Option<AttributeList> {
    let last = node.last_child()?;
    let (before, list) = {
        let data = last.data.borrow();
        let NodeValue::Text(text) = &data.value else {
            return None;
        };
        let content: &str = text;
        let (before, list) = AttributeList::split_trailing(content)?;
        (before.trim_end().to_string(), list)
    };

    if own_line {
        if !before.is_empty() {
            return None;
        }
        let previous = last.previous_sibling()?;
        let is_break = matches!(
            previous.data.borrow().value,
            NodeValue::SoftBreak | NodeValue::LineBreak
        );
        if !is_break {
            return None;
        }
        last.detach();
        previous.detach();
    } else if before.is_empty() {
        last.detach();
    } else {
        set_text(last, before);
    }

    Some(list)
}

fn peek_trailing_id(node: &AstNode<'_>) -> Option<String> {
    let last = node.last_child()?;
    let data = last.data.borrow();
    let NodeValue::Text(text) = &data.value else {
        return None;
    };
    let content: &str = text;
    AttributeList::split_trailing(content).and_then(|(_, list)| list.id)
}

/// Remove a `{: … }` list that immediately follows the node.
fn take_leading_attributes<'a>(node: &'a AstNode<'a>) -> Option<AttributeList> {
    let next = node.next_sibling()?;
    let (list, rest) = {
        let data = next.data.borrow();
        let NodeValue::Text(text) = &data.value else {
            return None;
        };
        let content: &str = text;
        let (list, rest) = AttributeList::split_leading(content)?;
        (list, rest.to_string())
    };

    if rest.is_empty() {
        next.detach();
    } else {
        set_text(next, rest);
    }

    Some(list)
}

fn set_text(node: &AstNode<'_>, value: String) {
    let mut data = node.data.borrow_mut();
    if let NodeValue::Text(text) = &mut data.value {
        *text = value.into();
    }
}

fn render_children<'a>(
    node: &'a AstNode<'a>,
    options: &Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    for child in node.children() {
        format_html(child, options, &mut html).map_err(|err| RenderError::Markdown {
            message: err.to_string(),
        })?;
    }
    Ok(html)
}

fn replace_with_html_block(node: &AstNode<'_>, html: String) {
    {
        let mut data = node.data.borrow_mut();
        data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 0,
            literal: html,
        });
    }

    while let Some(child) = node.first_child() {
        child.detach();
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_inline_text(node: &AstNode<'_>) -> String {
    fn walk(node: &AstNode<'_>, buffer: &mut String) {
        {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => buffer.push_str(text),
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
                _ => {}
            }
        }
        let mut child = node.first_child();
        while let Some(next) = child {
            walk(next, buffer);
            child = next.next_sibling();
        }
    }

    let mut text = String::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        walk(next, &mut text);
        child = next.next_sibling();
    }
    text
}

fn extract_code_block(node: &AstNode<'_>) -> Option<(String, String)> {
    let data = node.data.borrow();
    if let NodeValue::CodeBlock(block) = &data.value {
        let info = block.info.trim().to_string();
        let literal = block.literal.clone();
        Some((info, literal))
    } else {
        None
    }
}

fn heading_level(node: &AstNode<'_>) -> Option<u8> {
    let data = node.data.borrow();
    if let NodeValue::Heading(heading) = &data.value {
        Some(heading.level)
    } else {
        None
    }
}

fn is_paragraph(node: &AstNode<'_>) -> bool {
    matches!(node.data.borrow().value, NodeValue::Paragraph)
}

fn is_image(node: &AstNode<'_>) -> bool {
    matches!(node.data.borrow().value, NodeValue::Image(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use comrak::{Arena, parse_document};

    use crate::application::render::service::{config::options_for, load_syntax_set};

    fn rewrite(markdown: &str, extensions: ExtensionSet) -> (String, RewriteOutcome) {
        let options = options_for(&extensions);
        let syntax_set = load_syntax_set();
        let class_style = ClassStyle::SpacedPrefixed { prefix: "syntax-" };
        let context = RewriteContext {
            options: &options,
            syntax_set: &syntax_set,
            class_style: &class_style,
            extensions,
        };

        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &options);
        let outcome = rewrite_ast(root, &context).expect("rewrite");

        let mut html = String::new();
        format_html(root, &options, &mut html).expect("html");
        (html, outcome)
    }

    #[test]
    fn headings_receive_unique_anchor_ids() {
        let (html, outcome) = rewrite("# Overview\n\n## Overview\n", ExtensionSet::default());

        assert!(html.contains("<h1 id=\"overview\">Overview</h1>"));
        assert!(html.contains("<h2 id=\"overview-2\">Overview</h2>"));
        assert_eq!(outcome.headings.len(), 2);
        assert_eq!(outcome.headings[1].id, "overview-2");
    }

    #[test]
    fn explicit_id_on_a_later_heading_wins_over_generated_anchor() {
        let (html, outcome) = rewrite("# Intro\n\n## Other {: #intro }\n", ExtensionSet::default());

        assert!(html.contains("<h1 id=\"intro-2\">Intro</h1>"));
        assert!(html.contains("<h2 id=\"intro\">Other</h2>"));
        assert_eq!(html.matches("id=\"intro\"").count(), 1);
        assert_eq!(outcome.headings[0].id, "intro-2");
        assert_eq!(outcome.headings[1].id, "intro");
    }

    #[test]
    fn heading_attribute_list_sets_id_and_class() {
        let (html, outcome) = rewrite(
            "## Data Flow {: #flow .wide }\n",
            ExtensionSet::default(),
        );

        assert!(
            html.contains("<h2 id=\"flow\" class=\"wide\">Data Flow</h2>"),
            "unexpected html: {html}"
        );
        assert_eq!(outcome.headings[0].text, "Data Flow");
    }

    #[test]
    fn attribute_lists_can_be_disabled() {
        let (html, _) = rewrite(
            "## Data Flow {: #flow }\n",
            ExtensionSet {
                attribute_lists: false,
                ..ExtensionSet::default()
            },
        );

        assert!(html.contains("{: #flow }"));
        assert!(html.contains("id=\"data-flow-flow\""));
    }

    #[test]
    fn paragraph_attribute_list_on_last_line() {
        let (html, _) = rewrite("Lead paragraph.\n{: .lead }\n", ExtensionSet::default());

        assert!(
            html.contains("<p class=\"lead\">Lead paragraph.</p>"),
            "unexpected html: {html}"
        );
        assert!(!html.contains("{: .lead }"));
    }

    #[test]
    fn braces_that_are_not_attributes_stay_as_text() {
        let (html, _) = rewrite("Set notation\n{a, b}\n", ExtensionSet::default());

        assert!(html.contains("{a, b}"));
    }

    #[test]
    fn image_attribute_list_is_applied() {
        let (html, _) = rewrite(
            "![Architecture](arch.png){: width=640 .figure }\n",
            ExtensionSet::default(),
        );

        assert!(
            html.contains("<img src=\"arch.png\" alt=\"Architecture\" class=\"figure\" width=\"640\" />"),
            "unexpected html: {html}"
        );
    }

    #[test]
    fn toc_marker_is_replaced_with_heading_links() {
        let (html, outcome) = rewrite(
            "[TOC]\n\n# Intro\n\n## Goals\n",
            ExtensionSet::default(),
        );

        assert!(html.contains("<div class=\"toc\">"));
        assert!(html.contains("<a href=\"#intro\">Intro</a>"));
        assert!(html.contains("<a href=\"#goals\">Goals</a>"));
        assert!(!html.contains("[TOC]"));
        assert!(outcome.toc_html.is_some());
    }

    #[test]
    fn code_blocks_are_highlighted() {
        let (html, outcome) = rewrite("```rust\nfn main() {}\n```\n", ExtensionSet::default());

        assert!(outcome.contains_code);
        assert!(html.contains("<pre class=\"syntax-highlight syntax-lang-rust\""));
        assert!(html.contains("syntax-"));
    }

    #[test]
    fn raw_html_is_escaped_when_disabled() {
        let markdown = "<div class=\"note\">Hi</div>\n\nInline <span>tag</span>.\n";
        let (html, _) = rewrite(
            markdown,
            ExtensionSet {
                raw_html: false,
                ..ExtensionSet::default()
            },
        );

        assert!(html.contains("&lt;div class=\"note\"&gt;Hi&lt;/div&gt;"));
        assert!(html.contains("&lt;span&gt;tag&lt;/span&gt;"));
        assert!(!html.contains("<span>"));
    }

    #[test]
    fn raw_html_passes_through_by_default() {
        let (html, _) = rewrite(
            "<div class=\"note\">Hi</div>\n",
            ExtensionSet::default(),
        );

        assert!(html.contains("<div class=\"note\">Hi</div>"));
    }
}
