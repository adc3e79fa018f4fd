//! Utilities for generating deterministic, human-friendly heading anchors.
//!
//! ASCII slugification (`slug` crate) is combined with Chinese
//! transliteration (`pinyin` crate) so headings like “基线对齐” become
//! `ji-xian-dui-qi`.

use std::collections::HashMap;

use pinyin::{Pinyin, ToPinyin};
use slug::slugify;
use thiserror::Error;

/// Anchor used when a heading has no sluggable text (punctuation only, …).
pub const FALLBACK_ANCHOR: &str = "section";

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let transliterated = transliterate_to_ascii(input);
    let candidate = slugify(&transliterated);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Deterministically generate unique anchor slugs within a single document.
///
/// Headings processed in order will receive monotonic suffixes when duplicates
/// occur (e.g. `section`, `section-2`, `section-3`). Ids assigned explicitly
/// through an attribute list are reserved so generated anchors never collide
/// with them.
#[derive(Default, Debug)]
pub struct AnchorSlugger {
    occurrences: HashMap<String, usize>,
}

impl AnchorSlugger {
    pub fn new() -> Self {
        Self {
            occurrences: HashMap::new(),
        }
    }

    /// Generate a unique anchor for the provided heading text. Headings that
    /// cannot produce a slug fall back to [`FALLBACK_ANCHOR`].
    pub fn anchor_for(&mut self, heading: &str) -> String {
        let base = derive_slug(heading).unwrap_or_else(|_| FALLBACK_ANCHOR.to_string());

        let mut candidate = base.clone();
        loop {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                candidate = format!("{base}-{}", *count);
            }
            if candidate == base || !self.occurrences.contains_key(&candidate) {
                break;
            }
        }

        if candidate != base {
            self.occurrences.insert(candidate.clone(), 1);
        }
        candidate
    }

    /// Record an explicitly assigned id so generated anchors skip it. Reserve
    /// ids before generating any anchor to keep them unique document-wide.
    pub fn reserve(&mut self, id: &str) {
        *self.occurrences.entry(id.to_string()).or_insert(0) += 1;
    }
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(py) => append_pinyin(&mut output, py),
            None if ch.is_whitespace() => output.push(' '),
            None => {
                // Left for slugify to filter.
                output.push(ch);
            }
        }
    }

    output
}

fn append_pinyin(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
}
