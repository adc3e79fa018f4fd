use crate::application::render::types::HeadingInfo;
use crate::domain::markup::{escape_attribute, escape_text};

/// Paragraph text that is replaced by the table of contents.
pub(crate) const TOC_MARKER: &str = "[TOC]";

/// Build a nested `<ul>` list linking to every heading.
///
/// Levels are relative: the first heading opens the outermost list, deeper
/// headings nest under the closest shallower one, and skipped levels (an
/// `h1` followed by an `h3`) nest only one step.
pub(crate) fn build_toc_html(headings: &[HeadingInfo]) -> Option<String> {
    if headings.is_empty() {
        return None;
    }

    let mut html = String::from("<div class=\"toc\">\n<ul>\n");
    // Levels of the currently open list items, outermost first.
    let mut open: Vec<u8> = Vec::new();

    for heading in headings {
        match open.last().copied() {
            None => {}
            Some(current) if heading.level > current => {
                html.push_str("\n<ul>\n");
            }
            Some(_) => {
                html.push_str("</li>\n");
                open.pop();
                while let Some(&parent) = open.last() {
                    if parent < heading.level {
                        break;
                    }
                    html.push_str("</ul>\n</li>\n");
                    open.pop();
                }
            }
        }

        html.push_str("<li><a href=\"#");
        html.push_str(&escape_attribute(&heading.id));
        html.push_str("\">");
        html.push_str(&escape_text(&heading.text));
        html.push_str("</a>");
        open.push(heading.level);
    }

    html.push_str("</li>\n");
    open.pop();
    while open.pop().is_some() {
        html.push_str("</ul>\n</li>\n");
    }
    html.push_str("</ul>\n</div>\n");

    Some(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(level: u8, id: &str) -> HeadingInfo {
        HeadingInfo {
            level,
            id: id.to_string(),
            text: id.to_uppercase(),
        }
    }

    #[test]
    fn empty_document_has_no_toc() {
        assert!(build_toc_html(&[]).is_none());
    }

    #[test]
    fn nests_deeper_headings() {
        let html = build_toc_html(&[
            heading(1, "a"),
            heading(2, "b"),
            heading(3, "c"),
            heading(2, "d"),
            heading(1, "e"),
        ])
        .expect("toc");

        let expected = "<div class=\"toc\">\n<ul>\n\
<li><a href=\"#a\">A</a>\n<ul>\n\
<li><a href=\"#b\">B</a>\n<ul>\n\
<li><a href=\"#c\">C</a></li>\n</ul>\n</li>\n\
<li><a href=\"#d\">D</a></li>\n</ul>\n</li>\n\
<li><a href=\"#e\">E</a></li>\n\
</ul>\n</div>\n";
        assert_eq!(html, expected);
    }

    #[test]
    fn skipped_levels_nest_one_step() {
        let html = build_toc_html(&[heading(2, "a"), heading(4, "b"), heading(3, "c")])
            .expect("toc");

        let expected = "<div class=\"toc\">\n<ul>\n\
<li><a href=\"#a\">A</a>\n<ul>\n\
<li><a href=\"#b\">B</a></li>\n\
<li><a href=\"#c\">C</a></li>\n</ul>\n</li>\n\
</ul>\n</div>\n";
        assert_eq!(html, expected);
    }

    #[test]
    fn escapes_heading_text() {
        let html = build_toc_html(&[HeadingInfo {
            level: 1,
            id: "a-b".to_string(),
            text: "A & <B>".to_string(),
        }])
        .expect("toc");

        assert!(html.contains("<a href=\"#a-b\">A &amp; &lt;B&gt;</a>"));
    }
}
