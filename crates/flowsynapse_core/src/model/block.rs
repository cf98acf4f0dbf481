//! Content block model.
//!
//! # Responsibility
//! - Define the typed content units that make up one note document.
//! - Match the editor's native JSON shape (`{"type": ..., "data": {...}}`).
//!
//! # Invariants
//! - `text` and list `items` are opaque rich-text markup; core code never
//!   interprets them beyond block-type dispatch.
//! - Header level is always within `1..=3`. Stored levels outside that range
//!   (the header tool can emit 4..=6) are clamped on load, never rejected.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Heading level accepted by the editor header tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct HeaderLevel(u8);

impl HeaderLevel {
    pub const H1: Self = Self(1);
    pub const H2: Self = Self(2);
    pub const H3: Self = Self(3);

    /// Validates a raw level value.
    pub fn new(level: u8) -> Result<Self, BlockValidationError> {
        if (1..=3).contains(&level) {
            Ok(Self(level))
        } else {
            Err(BlockValidationError::InvalidHeaderLevel(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl From<HeaderLevel> for u8 {
    fn from(value: HeaderLevel) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for HeaderLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        Ok(Self(raw.clamp(1, 3)))
    }
}

/// Ordering style of a list block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Ordered,
    Unordered,
}

/// One typed unit of rich-text content.
///
/// Serialized as `type` + `data` to stay byte-compatible with records the
/// editing surface produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Block {
    Header {
        text: String,
        level: HeaderLevel,
    },
    Paragraph {
        text: String,
    },
    List {
        style: ListStyle,
        #[serde(deserialize_with = "deserialize_list_items")]
        items: Vec<String>,
    },
}

impl Block {
    pub fn header(text: impl Into<String>, level: HeaderLevel) -> Self {
        Self::Header {
            text: text.into(),
            level,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into() }
    }

    pub fn list(style: ListStyle, items: Vec<String>) -> Self {
        Self::List { style, items }
    }

    /// Stable tag name, identical to the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Header { .. } => "header",
            Self::Paragraph { .. } => "paragraph",
            Self::List { .. } => "list",
        }
    }
}

/// Validation failures for block payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockValidationError {
    InvalidHeaderLevel(u8),
}

impl Display for BlockValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHeaderLevel(level) => {
                write!(f, "header level must be within 1..=3, got {level}")
            }
        }
    }
}

impl Error for BlockValidationError {}

/// Newer editor list tools persist items as objects instead of strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawListItem {
    Text(String),
    Object {
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
}

fn deserialize_list_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawListItem>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|item| match item {
            RawListItem::Text(text) => text,
            RawListItem::Object { content, text } => content.or(text).unwrap_or_default(),
        })
        .collect())
}
