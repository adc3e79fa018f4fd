use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use crate::application::render::types::RenderError;
use crate::domain::markup::{escape_attribute, escape_text};

const PLAIN_LANGUAGE: &str = "text";

/// Highlight a fenced code block into `<pre><code>` markup with `syntax-`
/// prefixed span classes. Unknown languages are highlighted as plain text.
pub(crate) fn highlight_code(
    language: Option<&str>,
    meta: Option<&str>,
    code: &str,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
) -> Result<String, RenderError> {
    let lang_token = language.unwrap_or(PLAIN_LANGUAGE);
    let syntax =
        find_syntax(syntax_set, lang_token).unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut code_with_newline = code.to_string();
    if !code_with_newline.ends_with('\n') {
        code_with_newline.push('\n');
    }

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, *class_style);

    for line in LinesWithEndings::from(code_with_newline.as_str()) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| RenderError::Highlighting {
                language: lang_token.to_string(),
                message: err.to_string(),
            })?;
    }

    Ok(wrap_code_block(lang_token, meta, &generator.finalize()))
}

/// Code block without highlighting, used when the highlight extension is off.
pub(crate) fn plain_code_block(language: Option<&str>, meta: Option<&str>, code: &str) -> String {
    let mut escaped = escape_text(code);
    if !escaped.ends_with('\n') {
        escaped.push('\n');
    }
    wrap_code_block(language.unwrap_or(PLAIN_LANGUAGE), meta, &escaped)
}

fn wrap_code_block(lang_token: &str, meta: Option<&str>, body: &str) -> String {
    let lang = escape_attribute(&lang_token.to_ascii_lowercase());
    let meta_attr = meta
        .filter(|m| !m.is_empty())
        .map(|m| format!(" data-meta=\"{}\"", escape_attribute(m)))
        .unwrap_or_default();

    format!(
        "<pre class=\"syntax-highlight syntax-lang-{lang}\" data-language=\"{lang}\"><code class=\"language-{lang} syntax-code\"{meta_attr}>{body}</code></pre>"
    )
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(&lowercase))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_block_escapes_markup() {
        let html = plain_code_block(Some("html"), None, "<b>bold</b>");

        assert!(html.starts_with("<pre class=\"syntax-highlight syntax-lang-html\""));
        assert!(html.contains("class=\"language-html syntax-code\""));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn plain_block_defaults_to_text_language() {
        let html = plain_code_block(None, Some("title=\"x\""), "a");

        assert!(html.contains("data-language=\"text\""));
        assert!(html.contains("data-meta=\"title=&quot;x&quot;\""));
    }
}
