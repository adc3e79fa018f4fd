//! Attribute lists: `{: #id .class key=value }` annotations that assign an id,
//! classes and arbitrary attributes to the element they follow.

use super::markup::escape_attribute;

/// Parsed attribute list. Classes keep their declaration order; later `#id`
/// tokens win over earlier ones, as do repeated keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
}

impl AttributeList {
    /// Parse a braced attribute list. The leading colon is optional. Returns
    /// `None` when the text is not a well-formed, non-empty attribute list so
    /// callers can keep it as literal text.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let inner = value.strip_prefix('{')?.strip_suffix('}')?;
        let inner = inner.trim();
        let inner = inner.strip_prefix(':').map(str::trim_start).unwrap_or(inner);

        let tokens = tokenize(inner)?;
        if tokens.is_empty() {
            return None;
        }

        let mut list = AttributeList::default();
        for token in tokens {
            if let Some(id) = token.strip_prefix('#') {
                if !is_name(id) {
                    return None;
                }
                list.id = Some(id.to_string());
            } else if let Some(class) = token.strip_prefix('.') {
                if !is_name(class) {
                    return None;
                }
                list.classes.push(class.to_string());
            } else if let Some((key, raw)) = token.split_once('=') {
                if !is_name(key) {
                    return None;
                }
                let value = unquote(raw);
                match key {
                    "id" => list.id = Some(value),
                    "class" => list
                        .classes
                        .extend(value.split_whitespace().map(str::to_string)),
                    _ => {
                        list.attributes.retain(|(existing, _)| existing != key);
                        list.attributes.push((key.to_string(), value));
                    }
                }
            } else {
                return None;
            }
        }

        Some(list)
    }

    /// Split `text` into the content before a trailing attribute list and the
    /// parsed list itself.
    pub fn split_trailing(text: &str) -> Option<(&str, Self)> {
        let trimmed = text.trim_end();
        if !trimmed.ends_with('}') {
            return None;
        }
        let open = trimmed.rfind('{')?;
        let list = Self::parse(&trimmed[open..])?;
        Some((&trimmed[..open], list))
    }

    /// Split `text` into a leading attribute list and the content after it.
    /// The list must start at the very first character.
    pub fn split_leading(text: &str) -> Option<(Self, &str)> {
        if !text.starts_with('{') {
            return None;
        }
        let close = text.find('}')?;
        let list = Self::parse(&text[..=close])?;
        Some((list, &text[close + 1..]))
    }

    /// Render the list as HTML attributes, each preceded by a space.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        if let Some(id) = self.id.as_deref() {
            push_attribute(&mut html, "id", id);
        }
        if !self.classes.is_empty() {
            push_attribute(&mut html, "class", &self.classes.join(" "));
        }
        for (key, value) in &self.attributes {
            push_attribute(&mut html, key, value);
        }
        html
    }
}

fn push_attribute(buffer: &mut String, key: &str, value: &str) {
    buffer.push(' ');
    buffer.push_str(key);
    buffer.push_str("=\"");
    buffer.push_str(&escape_attribute(value));
    buffer.push('"');
}

fn tokenize(inner: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in inner.chars() {
        match quote {
            Some(q) if ch == q => {
                quote = None;
                current.push(ch);
            }
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(ch),
        }
    }

    if quote.is_some() {
        return None;
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Some(tokens)
}

fn unquote(raw: &str) -> String {
    for q in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(q) && raw.ends_with(q) {
            return raw[1..raw.len() - 1].to_string();
        }
    }
    raw.to_string()
}

fn is_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | ':' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_classes_and_pairs() {
        let list = AttributeList::parse("{: #intro .lead .wide data-x=1 title=\"Hello world\" }")
            .expect("attribute list");

        assert_eq!(list.id.as_deref(), Some("intro"));
        assert_eq!(list.classes, vec!["lead", "wide"]);
        assert_eq!(
            list.attributes,
            vec![
                ("data-x".to_string(), "1".to_string()),
                ("title".to_string(), "Hello world".to_string()),
            ]
        );
    }

    #[test]
    fn colon_is_optional() {
        let list = AttributeList::parse("{#anchor}").expect("attribute list");
        assert_eq!(list.id.as_deref(), Some("anchor"));
    }

    #[test]
    fn rejects_plain_braced_text() {
        assert!(AttributeList::parse("{not an attribute list}").is_none());
        assert!(AttributeList::parse("{}").is_none());
        assert!(AttributeList::parse("{: title=\"unterminated }").is_none());
    }

    #[test]
    fn splits_trailing_list_from_heading_text() {
        let (text, list) = AttributeList::split_trailing("Overview {: .intro }").expect("split");
        assert_eq!(text, "Overview ");
        assert_eq!(list.classes, vec!["intro"]);

        assert!(AttributeList::split_trailing("Set {a, b}").is_none());
    }

    #[test]
    fn splits_leading_list() {
        let (list, rest) = AttributeList::split_leading("{: width=640 } caption").expect("split");
        assert_eq!(
            list.attributes,
            vec![("width".to_string(), "640".to_string())]
        );
        assert_eq!(rest, " caption");
    }

    #[test]
    fn renders_escaped_html_attributes() {
        let list = AttributeList::parse("{: #a .b title='x \"y\"' }").expect("attribute list");
        assert_eq!(
            list.to_html(),
            " id=\"a\" class=\"b\" title=\"x &quot;y&quot;\""
        );
    }
}
