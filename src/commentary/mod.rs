//! Commentary entries: raw service records, their normalized form, and the
//! sort/filter/summary passes over them.

mod filter;
mod normalize;
mod sort;
mod sources;

pub use filter::{Collection, Filter, FilterOutcome, FilterState, apply_filter};
pub use normalize::normalize;
pub use sort::{compare_entries, sort_entries};
pub use sources::{
    CommentatorCount, SourceCount, SourcesSummary, count_label, empty_message, summarize,
};

use crate::config::AppConfig;
use crate::document::TextNode;
use crate::reference::Reference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number-or-string JSON field such as `anchorVerse` (`3` or `"2 4 6"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Number(f64),
    Text(String),
}

impl Loose {
    /// Leading integer, the way `parseInt` reads it.
    pub fn leading_int(&self) -> Option<u32> {
        match self {
            Loose::Number(n) if n.is_finite() && *n >= 0.0 => Some(n.trunc() as u32),
            Loose::Number(_) => None,
            Loose::Text(text) => {
                let digits: String = text
                    .trim_start()
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse().ok()
            }
        }
    }
}

/// A commentary, note or sheet record as the texts service returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub anchor_verse: Option<Loose>,
    #[serde(rename = "ref")]
    pub source_ref: Option<String>,
    pub commentator: Option<String>,
    pub he_commentator: Option<String>,
    pub category: Option<String>,
    pub text: TextNode,
    pub he: TextNode,
    pub anchor_text: Option<String>,
    pub commentary_num: Option<Loose>,
    pub owner: Option<u64>,
    pub public: Option<bool>,
    pub title: Option<String>,
    pub he_title: Option<String>,
}

/// The base-text segments an entry is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Anchor {
    segments: Vec<u32>,
}

impl Anchor {
    pub fn single(segment: u32) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    /// Read an anchor field; compound anchors are whitespace separated.
    pub fn from_loose(value: Option<&Loose>) -> Self {
        let segments = match value {
            Some(Loose::Text(text)) => text
                .split_whitespace()
                .filter_map(|token| Loose::Text(token.to_string()).leading_int())
                .collect(),
            Some(number) => number.leading_int().into_iter().collect(),
            None => Vec::new(),
        };
        Self { segments }
    }

    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    /// Leading segment used for ordering; 0 when the anchor is missing.
    pub fn leading(&self) -> u32 {
        self.segments.first().copied().unwrap_or(0)
    }

    pub fn contains(&self, segment: u32) -> bool {
        self.segments.contains(&segment)
    }

    /// True if any anchored segment falls inside `first..=last`.
    pub fn intersects(&self, first: u32, last: u32) -> bool {
        self.segments.iter().any(|s| (first..=last).contains(s))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ts_rs::TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EntryKind {
    Commentary,
    Note,
    Sheet,
}

impl EntryKind {
    fn from_type(kind: Option<&str>) -> Self {
        match kind {
            Some("note") => EntryKind::Note,
            Some("sheet") => EntryKind::Sheet,
            _ => EntryKind::Commentary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ts_rs::TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Language {
    Bilingual,
    HeOnly,
    EnOnly,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ts_rs::TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Visibility {
    Public,
    Private,
}

/// A normalized commentary, note or sheet entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentaryEntry {
    pub id: Option<String>,
    /// Position in the raw collection the entry came from.
    pub source_index: usize,
    pub anchor: Anchor,
    pub source_ref: Option<Reference>,
    pub source_ref_text: String,
    pub commentator: String,
    pub he_commentator: String,
    pub category: String,
    pub kind: EntryKind,
    pub link_type: String,
    pub english: String,
    pub hebrew: String,
    pub anchor_text: String,
    pub order_within_source: u32,
    pub owner: Option<u64>,
    pub visibility: Option<Visibility>,
    pub title: Option<String>,
    pub color_index: usize,
    pub language: Language,
}

impl CommentaryEntry {
    /// `"<category> <commentator>"`, the string category filters match against.
    pub fn filter_key(&self) -> String {
        format!("{} {}", self.category, self.commentator)
    }

    /// Commentator label; Talmud links also show the daf they point at.
    pub fn display_name(&self) -> String {
        if self.category == "Talmud" {
            if let Some(first) = self.source_ref.as_ref().and_then(|r| r.sections().first()) {
                return format!("{} {first}", self.commentator);
            }
        }
        self.commentator.clone()
    }

    pub fn is_note(&self) -> bool {
        self.kind == EntryKind::Note
    }
}

/// Display colours assigned to commentators in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        Self { colors }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.palette.clone())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: AppConfig::default().palette,
        }
    }
}
