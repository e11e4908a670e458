use super::CommentaryEntry;
use std::collections::BTreeMap;
use std::fmt;

/// Sidebar filter. `Notes` and `Sheets` switch the shown collection rather
/// than narrowing the commentary list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Category(String),
    Notes,
    Sheets,
}

/// Which raw collection of the document feeds the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Commentary,
    Notes,
    Sheets,
}

impl Filter {
    pub fn parse(name: &str) -> Filter {
        let name = name.trim();
        match name.to_ascii_lowercase().as_str() {
            "" | "all" => Filter::All,
            "notes" => Filter::Notes,
            "sheets" => Filter::Sheets,
            _ => Filter::Category(name.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Filter::All => "all",
            Filter::Category(name) => name,
            Filter::Notes => "Notes",
            Filter::Sheets => "Sheets",
        }
    }

    pub fn is_mode(&self) -> bool {
        matches!(self, Filter::Notes | Filter::Sheets)
    }

    /// Category filters match when their words appear, in order and
    /// adjacent, among the words of the entry's `"<category> <commentator>"`
    /// key.
    pub fn matches(&self, entry: &CommentaryEntry) -> bool {
        match self {
            Filter::All | Filter::Notes | Filter::Sheets => true,
            Filter::Category(name) => contains_words(&entry.filter_key(), name),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn contains_words(haystack: &str, needle: &str) -> bool {
    let needle: Vec<&str> = needle.split_whitespace().collect();
    if needle.is_empty() {
        return true;
    }
    let words: Vec<&str> = haystack.split_whitespace().collect();
    words.windows(needle.len()).any(|window| window == needle.as_slice())
}

/// Result of running a filter over a sorted entry list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOutcome {
    /// Parallel to the entry list.
    pub visible: Vec<bool>,
    /// Visible entries per category.
    pub counts: BTreeMap<String, usize>,
    pub visible_count: usize,
}

impl FilterOutcome {
    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    pub fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(i, &shown)| shown.then_some(i))
    }
}

pub fn apply_filter(entries: &[CommentaryEntry], filter: &Filter) -> FilterOutcome {
    let visible: Vec<bool> = entries.iter().map(|entry| filter.matches(entry)).collect();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for (entry, _) in entries.iter().zip(&visible).filter(|(_, shown)| **shown) {
        *counts.entry(entry.category.clone()).or_default() += 1;
    }
    let visible_count = visible.iter().filter(|shown| **shown).count();
    FilterOutcome {
        visible,
        counts,
        visible_count,
    }
}

/// Current filter plus the one to restore when leaving Notes or Sheets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub current: Filter,
    pub previous: Filter,
}

impl FilterState {
    pub fn new(initial: Filter) -> Self {
        let previous = if initial.is_mode() {
            Filter::All
        } else {
            initial.clone()
        };
        Self {
            current: initial,
            previous,
        }
    }

    /// Switch filters, remembering the last non-mode filter.
    pub fn select(&mut self, filter: Filter) {
        if filter.is_mode() && !self.current.is_mode() {
            self.previous = self.current.clone();
        }
        self.current = filter;
    }

    /// Return from Notes/Sheets to the remembered filter.
    pub fn leave_mode(&mut self) {
        if self.current.is_mode() {
            self.current = self.previous.clone();
        }
    }

    pub fn collection(&self) -> Collection {
        match self.current {
            Filter::Notes => Collection::Notes,
            Filter::Sheets => Collection::Sheets,
            Filter::All | Filter::Category(_) => Collection::Commentary,
        }
    }
}
