//! Segment selection, the dimming it implies, and viewport tracking.

use crate::commentary::CommentaryEntry;
use crate::reference::Reference;
use serde::Serialize;
use ts_rs::TS;

/// Highlight state of the base text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Selection {
    #[default]
    Unselected,
    Range { first: u32, last: u32 },
}

impl Selection {
    pub fn range_of(first: u32, last: u32) -> Self {
        Selection::Range {
            first: first.min(last),
            last: first.max(last),
        }
    }

    /// Apply a click on segment `k`.
    ///
    /// Clicking the sole selected segment clears the selection, a second
    /// segment extends a single selection, and any click on a multi-segment
    /// range starts over from `k`.
    pub fn click(&mut self, k: u32) {
        *self = match *self {
            Selection::Unselected => Selection::range_of(k, k),
            Selection::Range { first, last } if first == last && first == k => {
                Selection::Unselected
            }
            Selection::Range { first, last } if first == last => Selection::range_of(first, k),
            Selection::Range { .. } => Selection::range_of(k, k),
        };
    }

    pub fn reset(&mut self) {
        *self = Selection::Unselected;
    }

    pub fn range(&self) -> Option<(u32, u32)> {
        match *self {
            Selection::Unselected => None,
            Selection::Range { first, last } => Some((first, last)),
        }
    }

    pub fn contains(&self, segment: u32) -> bool {
        self.range()
            .is_some_and(|(first, last)| (first..=last).contains(&segment))
    }
}

/// Which segments and entries are dimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lowlight {
    /// Parallel to the segments; `true` means dimmed.
    pub segments: Vec<bool>,
    /// Parallel to the sorted entries; `true` means dimmed.
    pub entries: Vec<bool>,
}

impl Lowlight {
    /// Dim everything outside the selection. An expanded entry dims every
    /// other entry regardless of selection.
    pub fn project(
        selection: Selection,
        segment_count: usize,
        entries: &[CommentaryEntry],
        expanded: Option<usize>,
    ) -> Self {
        let segments = (1..=segment_count as u32)
            .map(|segment| selection.range().is_some() && !selection.contains(segment))
            .collect();
        let entries = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| match (expanded, selection.range()) {
                (Some(open), _) => idx != open,
                (None, Some((first, last))) => !entry.anchor.intersects(first, last),
                (None, None) => false,
            })
            .collect();
        Self { segments, entries }
    }

    pub fn is_active(&self) -> bool {
        self.segments.iter().chain(self.entries.iter()).any(|dim| *dim)
    }

    pub fn entry_dimmed(&self, idx: usize) -> bool {
        self.entries.get(idx).copied().unwrap_or(false)
    }
}

/// First and last segments (1-based) currently in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct VisibleWindow {
    pub first: u32,
    pub last: u32,
}

impl VisibleWindow {
    /// `first` is the first segment starting below the viewport top (plus
    /// `top_inset`); `last` is the last one starting above the bottom edge.
    pub fn from_tops(
        tops: &[f32],
        scroll_top: f32,
        viewport_height: f32,
        top_inset: f32,
    ) -> Option<Self> {
        if tops.is_empty() {
            return None;
        }
        let window_top = scroll_top + top_inset;
        let window_bottom = scroll_top + viewport_height;
        let first_idx = tops
            .iter()
            .position(|&top| top > window_top)
            .unwrap_or(tops.len() - 1);
        let last_idx = tops
            .iter()
            .rposition(|&top| top <= window_bottom)
            .unwrap_or(first_idx)
            .max(first_idx);
        Some(Self {
            first: first_idx as u32 + 1,
            last: last_idx as u32 + 1,
        })
    }
}

/// Citation for the selected segments of the current page, e.g.
/// `Genesis 1:3-5`.
pub fn selected_citation(reference: &Reference, selection: Selection) -> Option<String> {
    let (first, last) = selection.range()?;
    reference
        .with_leaf_range(first, last)
        .map(|narrowed| narrowed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::{Anchor, EntryKind, Language, Loose};

    fn entry(anchor: &str) -> CommentaryEntry {
        CommentaryEntry {
            id: None,
            source_index: 0,
            anchor: Anchor::from_loose(Some(&Loose::Text(anchor.to_string()))),
            source_ref: None,
            source_ref_text: String::new(),
            commentator: "Rashi".to_string(),
            he_commentator: "Rashi".to_string(),
            category: "Commentary".to_string(),
            kind: EntryKind::Commentary,
            link_type: "commentary".to_string(),
            english: String::new(),
            hebrew: String::new(),
            anchor_text: String::new(),
            order_within_source: 0,
            owner: None,
            visibility: None,
            title: None,
            color_index: 0,
            language: Language::Empty,
        }
    }

    #[test]
    fn clicking_the_sole_selected_segment_toggles_off() {
        let mut selection = Selection::Unselected;
        selection.click(3);
        assert_eq!(selection, Selection::Range { first: 3, last: 3 });
        selection.click(3);
        assert_eq!(selection, Selection::Unselected);
    }

    #[test]
    fn second_click_extends_a_single_selection() {
        let mut selection = Selection::range_of(3, 3);
        selection.click(7);
        assert_eq!(selection, Selection::Range { first: 3, last: 7 });

        let mut backwards = Selection::range_of(5, 5);
        backwards.click(2);
        assert_eq!(backwards, Selection::Range { first: 2, last: 5 });
    }

    #[test]
    fn click_on_a_range_collapses_to_the_clicked_segment() {
        let mut selection = Selection::range_of(3, 7);
        selection.click(5);
        assert_eq!(selection, Selection::Range { first: 5, last: 5 });
        selection.reset();
        assert_eq!(selection, Selection::Unselected);
    }

    #[test]
    fn lowlight_keeps_selected_segments_and_matching_entries() {
        let entries = vec![entry("1"), entry("2 4 6"), entry("5")];
        let lowlight = Lowlight::project(Selection::range_of(3, 4), 6, &entries, None);
        assert_eq!(lowlight.segments, vec![true, true, false, false, true, true]);
        assert_eq!(lowlight.entries, vec![true, false, true]);
        assert!(lowlight.is_active());

        let none = Lowlight::project(Selection::Unselected, 6, &entries, None);
        assert!(!none.is_active());
    }

    #[test]
    fn expanded_entry_dims_the_others() {
        let entries = vec![entry("1"), entry("2")];
        let lowlight = Lowlight::project(Selection::Unselected, 2, &entries, Some(1));
        assert_eq!(lowlight.entries, vec![true, false]);
        assert!(!lowlight.entry_dimmed(1));
    }

    #[test]
    fn visible_window_from_tops() {
        let tops = [0.0, 100.0, 200.0, 300.0, 400.0];
        let window = VisibleWindow::from_tops(&tops, 90.0, 250.0, 40.0).unwrap();
        assert_eq!(window, VisibleWindow { first: 3, last: 4 });
        let past_end = VisibleWindow::from_tops(&tops, 1000.0, 250.0, 40.0).unwrap();
        assert_eq!(past_end, VisibleWindow { first: 5, last: 5 });
        assert!(VisibleWindow::from_tops(&[], 0.0, 100.0, 40.0).is_none());
    }

    #[test]
    fn citation_for_a_selected_range() {
        let reference = Reference::parse_loose("Genesis 1").unwrap();
        let reference = Reference::new(
            reference.book(),
            reference.sections().to_vec(),
            None,
            vec!["Chapter".to_string(), "Verse".to_string()],
        )
        .unwrap();
        assert_eq!(
            selected_citation(&reference, Selection::range_of(3, 5)).as_deref(),
            Some("Genesis 1:3-5")
        );
        assert_eq!(selected_citation(&reference, Selection::Unselected), None);
    }
}
