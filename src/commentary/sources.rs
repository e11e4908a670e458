use super::{CommentaryEntry, Filter, FilterState, Palette};
use crate::text_utils::proper_case;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct CommentatorCount {
    pub commentator: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SourceCount {
    pub category: String,
    pub count: usize,
    pub color: String,
    pub commentators: Vec<CommentatorCount>,
}

/// Sources panel content: a total plus per-category counts, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
pub struct SourcesSummary {
    pub total: usize,
    pub categories: Vec<SourceCount>,
}

impl SourcesSummary {
    pub fn category(&self, name: &str) -> Option<&SourceCount> {
        self.categories.iter().find(|c| c.category == name)
    }
}

/// Count entries per category and commentator, optionally only those
/// anchored inside `range`. An active category filter with no entries is
/// still listed, with a zero count.
pub fn summarize(
    entries: &[CommentaryEntry],
    range: Option<(u32, u32)>,
    current: &Filter,
    palette: &Palette,
) -> SourcesSummary {
    let mut categories: Vec<SourceCount> = Vec::new();
    let mut total = 0;

    for entry in entries {
        if let Some((first, last)) = range {
            if !entry.anchor.intersects(first, last) {
                continue;
            }
        }
        let position = match categories.iter().position(|c| c.category == entry.category) {
            Some(position) => position,
            None => {
                categories.push(SourceCount {
                    category: entry.category.clone(),
                    count: 0,
                    color: palette.color(categories.len()).to_string(),
                    commentators: Vec::new(),
                });
                categories.len() - 1
            }
        };
        let category = &mut categories[position];
        category.count += 1;
        match category
            .commentators
            .iter()
            .position(|c| c.commentator == entry.commentator)
        {
            Some(sub) => category.commentators[sub].count += 1,
            None => category.commentators.push(CommentatorCount {
                commentator: entry.commentator.clone(),
                count: 1,
            }),
        }
        total += 1;
    }

    if let Filter::Category(name) = current {
        if !categories.iter().any(|c| &c.category == name) {
            categories.push(SourceCount {
                category: name.clone(),
                count: 0,
                color: palette.color(categories.len()).to_string(),
                commentators: Vec::new(),
            });
        }
    }

    for category in &mut categories {
        category.commentators.sort_by(|a, b| b.count.cmp(&a.count));
    }
    categories.sort_by(|a, b| b.count.cmp(&a.count));

    SourcesSummary { total, categories }
}

/// Header text such as `12 Sources` or `3 Sources (Midrash)`.
///
/// `shown` is the number of visible, non-dimmed entries; in Notes/Sheets
/// mode the commentary total is reported against the remembered filter.
pub fn count_label(state: &FilterState, shown: usize, commentary_total: usize) -> String {
    match &state.current {
        Filter::All => format!("{shown} Sources"),
        Filter::Category(name) => format!("{shown} Sources ({})", proper_case(name)),
        Filter::Notes | Filter::Sheets => match &state.previous {
            Filter::Category(name) => {
                format!("{commentary_total} Sources ({})", proper_case(name))
            }
            _ => format!("{commentary_total} Sources"),
        },
    }
}

/// Message shown when a non-`all` filter leaves the sidebar empty.
pub fn empty_message(filter: &Filter, visible_count: usize) -> Option<String> {
    if visible_count > 0 || *filter == Filter::All {
        return None;
    }
    Some(format!("There are no {} here.", filter.label()))
}
