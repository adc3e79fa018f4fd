//! HTML escaping for text and attribute values.

/// Escape text content. Whitespace, including newlines, is kept as-is so the
/// result is safe inside `<pre>` blocks.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape a value for use inside a double-quoted HTML attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_escaping_preserves_newlines() {
        assert_eq!(escape_text("a < b\n&c"), "a &lt; b\n&amp;c");
    }

    #[test]
    fn attribute_escaping_flattens_whitespace() {
        assert_eq!(escape_attribute("\"x\"\ty"), "&quot;x&quot; y");
    }
}
