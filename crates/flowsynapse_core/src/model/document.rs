//! Note document model.
//!
//! # Responsibility
//! - Define the persisted note record and its default skeleton.
//!
//! # Invariants
//! - `id` is unique within a collection and never reused.
//! - `title`/`preview` are derived from `blocks` and never authoritative.
//! - `blocks[0]` is conventionally the title-bearing header.

use crate::model::block::{Block, HeaderLevel};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Title given to freshly created documents.
pub const DEFAULT_TITLE: &str = "Untitled Note";
/// Placeholder paragraph of the default skeleton.
pub const DEFAULT_BODY: &str = "Start typing here...";
/// Display label for a document touched in this session.
pub const JUST_NOW_LABEL: &str = "Just now";

/// Document identifier: creation timestamp in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One note: an ordered block sequence plus derived display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    /// Human-readable recency label (`Just now`, `2d ago`).
    pub date: String,
    /// Plain-text summary, at most 30 chars plus `...`.
    pub preview: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// Last save in epoch milliseconds; absent on legacy records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Document {
    /// Builds the default two-block skeleton for a new note.
    pub fn with_default_skeleton(id: DocumentId) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            date: JUST_NOW_LABEL.to_string(),
            preview: DEFAULT_BODY.to_string(),
            blocks: default_blocks(),
            updated_at: Some(id.0),
        }
    }
}

/// Default block sequence: title header followed by a placeholder paragraph.
pub fn default_blocks() -> Vec<Block> {
    vec![
        Block::header(DEFAULT_TITLE, HeaderLevel::H1),
        Block::paragraph(DEFAULT_BODY),
    ]
}

/// Formats a relative age label for list rows.
///
/// Negative ages (clock skew) are reported as `Just now`.
pub fn relative_age_label(then_ms: i64, now_ms: i64) -> String {
    let elapsed_secs = now_ms.saturating_sub(then_ms) / 1000;
    if elapsed_secs < 60 {
        return JUST_NOW_LABEL.to_string();
    }
    let minutes = elapsed_secs / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}
