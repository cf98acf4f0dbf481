//! Title and preview derivation from block sequences.
//!
//! # Responsibility
//! - Derive a document's display title and plain-text preview.
//!
//! # Invariants
//! - `extract` is total and deterministic: it never fails and the same input
//!   always yields the same summary.
//! - Block markup is only stripped for display; stored blocks are untouched.

use crate::model::block::Block;
use crate::model::document::DEFAULT_TITLE;
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum preview length in characters before the ellipsis marker.
pub const PREVIEW_CHAR_BUDGET: usize = 30;
/// Marker appended to truncated previews.
pub const ELLIPSIS: &str = "...";
/// Preview used when a document has no paragraph block.
pub const NO_PREVIEW_LABEL: &str = "No additional text";

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#x27;", "'"),
    // Must stay last so `&amp;lt;` decodes to `&lt;`, not `<`.
    ("&amp;", "&"),
];

/// Display projection of a block sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub title: String,
    pub preview: String,
}

/// Derives `(title, preview)` from `blocks`.
///
/// Title precedence: first header with non-blank text, then
/// `previous_title` when non-blank, then `Untitled Note`.
/// Preview: first paragraph as plain text, truncated to
/// `PREVIEW_CHAR_BUDGET` chars plus `...`; `No additional text` otherwise.
pub fn extract(blocks: &[Block], previous_title: Option<&str>) -> Summary {
    let title = blocks
        .iter()
        .find_map(|block| match block {
            Block::Header { text, .. } => Some(plain_text(text)),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .or_else(|| {
            previous_title
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let preview = blocks
        .iter()
        .find_map(|block| match block {
            Block::Paragraph { text } => Some(truncate_preview(&plain_text(text))),
            _ => None,
        })
        .unwrap_or_else(|| NO_PREVIEW_LABEL.to_string());

    Summary { title, preview }
}

/// Strips rich-text markup to its text content with collapsed whitespace.
pub fn plain_text(markup: &str) -> String {
    let without_tags = HTML_TAG_RE.replace_all(markup, " ");
    let mut decoded = without_tags.into_owned();
    for (entity, replacement) in HTML_ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHAR_BUDGET {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(PREVIEW_CHAR_BUDGET).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
