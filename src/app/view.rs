use super::state::Reader;
use crate::commentary::{EntryKind, Filter, Language, SourcesSummary, count_label, empty_message};
use crate::scroll_map::LayoutProvider;
use crate::selection::{Selection, VisibleWindow, selected_citation};
use crate::text_utils::{long_commentary_text, short_commentary_text};
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SegmentView {
    pub index: u32,
    pub english: String,
    pub hebrew: String,
    pub lowlight: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct EntryView {
    pub id: Option<String>,
    pub anchor: String,
    pub commentator: String,
    pub he_commentator: String,
    pub category: String,
    pub kind: EntryKind,
    pub language: Language,
    pub color: String,
    pub english: String,
    pub hebrew: String,
    pub source_ref: String,
    pub anchor_text: String,
    pub visible: bool,
    pub lowlight: bool,
    pub expanded: bool,
    /// A note owned by the signed-in user.
    pub mine: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SidebarState {
    Empty,
    Populated,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SidebarView {
    pub filter: String,
    pub previous_filter: String,
    pub count_label: String,
    pub state: SidebarState,
    pub empty_message: Option<String>,
    pub offer_add_note: bool,
}

/// Everything the renderer needs to draw the reader.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ReaderSnapshot {
    pub reference: Option<String>,
    pub url: Option<String>,
    pub title: String,
    pub loading: bool,
    pub thread: Vec<String>,
    pub segments: Vec<SegmentView>,
    pub entries: Vec<EntryView>,
    pub sidebar: SidebarView,
    pub sources: SourcesSummary,
    pub scroll_map: Vec<f32>,
    pub selection: Selection,
    pub selected_citation: Option<String>,
    pub visible: Option<VisibleWindow>,
    pub panel_target: Option<usize>,
    pub expanded: Option<usize>,
    pub commentary_visible: bool,
    pub citation_check: String,
    pub notice: Option<String>,
}

impl<L: LayoutProvider> Reader<L> {
    pub fn snapshot(&self) -> ReaderSnapshot {
        let doc = self.document.as_ref();

        let segments = doc
            .map(|doc| {
                doc.segments
                    .iter()
                    .enumerate()
                    .map(|(idx, segment)| SegmentView {
                        index: segment.index,
                        english: segment.english.clone(),
                        hebrew: segment.hebrew.clone(),
                        lowlight: self.lowlight.segments.get(idx).copied().unwrap_or(false),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let entries: Vec<EntryView> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let expanded = self.expanded == Some(idx);
                let (english, hebrew) = if expanded {
                    (
                        long_commentary_text(&entry.english, &entry.hebrew),
                        long_commentary_text(&entry.hebrew, &entry.english),
                    )
                } else {
                    (
                        short_commentary_text(&entry.english, &entry.hebrew, self.limits),
                        short_commentary_text(&entry.hebrew, &entry.english, self.limits),
                    )
                };
                EntryView {
                    id: entry.id.clone(),
                    anchor: entry.anchor.to_string(),
                    commentator: entry.display_name(),
                    he_commentator: entry.he_commentator.clone(),
                    category: entry.category.clone(),
                    kind: entry.kind,
                    language: entry.language,
                    color: self.palette.color(entry.color_index).to_string(),
                    english,
                    hebrew,
                    source_ref: entry.source_ref_text.clone(),
                    anchor_text: entry.anchor_text.clone(),
                    visible: self.outcome.is_visible(idx),
                    lowlight: self.lowlight.entry_dimmed(idx),
                    expanded,
                    mine: entry.is_note() && entry.owner.is_some() && entry.owner == self.user_id,
                }
            })
            .collect();

        let shown = entries
            .iter()
            .filter(|entry| entry.visible && !entry.lowlight)
            .count();
        let state = if self.outcome.visible_count == 0 {
            SidebarState::Empty
        } else {
            SidebarState::Populated
        };
        let sidebar = SidebarView {
            filter: self.filter.current.label().to_string(),
            previous_filter: self.filter.previous.label().to_string(),
            count_label: count_label(&self.filter, shown, self.commentary.len()),
            state,
            empty_message: empty_message(&self.filter.current, self.outcome.visible_count),
            offer_add_note: self.filter.current == Filter::Notes,
        };

        ReaderSnapshot {
            reference: doc.map(|doc| doc.reference.to_string()),
            url: doc.map(|doc| doc.reference.url()),
            title: doc.map(|doc| doc.title.clone()).unwrap_or_default(),
            loading: self.is_loading(),
            thread: self.thread.clone(),
            segments,
            entries,
            sidebar,
            sources: self.sources.clone(),
            scroll_map: self.scroll_map.offsets().to_vec(),
            selection: self.selection,
            selected_citation: doc.and_then(|doc| selected_citation(&doc.reference, self.selection)),
            visible: self.window,
            panel_target: self.panel_target,
            expanded: self.expanded,
            commentary_visible: self.commentary_visible,
            citation_check: self.citation_check.message(),
            notice: self.notice.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DocumentCache;
    use crate::config::AppConfig;
    use crate::document::DocumentRecord;
    use crate::reference::Library;
    use crate::scroll_map::FixedLayout;

    fn build_test_reader() -> Reader<FixedLayout> {
        let mut reader = Reader::with_cache(
            AppConfig::default(),
            Library::builtin(),
            FixedLayout::new(vec![0.0, 100.0, 250.0], 600.0),
            DocumentCache::in_memory(),
        );
        let long = "word ".repeat(60);
        let record: DocumentRecord = serde_json::from_value(serde_json::json!({
            "ref": "Genesis 1",
            "text": ["one", "two", "three"],
            "commentary": [
                {"_id": "a", "anchorVerse": 1, "commentator": "Rashi", "category": "Commentary", "text": long},
                {"_id": "b", "anchorVerse": 2, "commentator": "Bereshit Rabbah", "category": "Midrash", "he": "מדרש"},
            ],
            "notes": [
                {"_id": "n1", "anchorVerse": 2, "text": "Mine", "type": "note", "owner": 7},
                {"_id": "n2", "anchorVerse": 3, "text": "Theirs", "type": "note", "owner": 8, "public": true},
            ],
        }))
        .unwrap();
        reader.set_user(Some(7));
        reader.render_document(record);
        reader.layout_settled(None);
        reader
    }

    #[test]
    fn snapshot_describes_the_page() {
        let reader = build_test_reader();
        let snapshot = reader.snapshot();
        assert_eq!(snapshot.reference.as_deref(), Some("Genesis 1"));
        assert_eq!(snapshot.url.as_deref(), Some("Genesis.1"));
        assert_eq!(snapshot.title, "Genesis Chapter 1");
        assert_eq!(snapshot.segments.len(), 3);
        assert_eq!(snapshot.sidebar.count_label, "2 Sources");
        assert_eq!(snapshot.sidebar.state, SidebarState::Populated);
        assert_eq!(snapshot.entries[0].english.chars().count(), 153);
        assert_eq!(snapshot.entries[1].english, "מדרש");
        assert_ne!(snapshot.entries[0].color, snapshot.entries[1].color);
    }

    #[test]
    fn expanded_entry_shows_the_full_text() {
        let mut reader = build_test_reader();
        reader.toggle_expanded(0);
        let snapshot = reader.snapshot();
        assert!(snapshot.entries[0].expanded);
        assert_eq!(snapshot.entries[0].english, "word ".repeat(60));
        assert!(snapshot.entries[1].lowlight);
        assert_eq!(snapshot.sidebar.count_label, "1 Sources");
    }

    #[test]
    fn empty_filter_reports_a_message() {
        let mut reader = build_test_reader();
        reader.set_filter(Filter::Category("Targum".to_string()));
        let snapshot = reader.snapshot();
        assert_eq!(snapshot.sidebar.state, SidebarState::Empty);
        assert_eq!(
            snapshot.sidebar.empty_message.as_deref(),
            Some("There are no Targum here.")
        );
        assert_eq!(snapshot.sources.category("Targum").map(|c| c.count), Some(0));
    }

    #[test]
    fn notes_mode_marks_own_notes() {
        let mut reader = build_test_reader();
        reader.set_filter(Filter::Notes);
        let snapshot = reader.snapshot();
        assert!(snapshot.sidebar.offer_add_note);
        assert_eq!(snapshot.sidebar.count_label, "2 Sources");
        let mine: Vec<bool> = snapshot.entries.iter().map(|e| e.mine).collect();
        assert_eq!(mine, vec![true, false]);
    }

    #[test]
    fn selection_is_reported_as_a_citation() {
        let mut reader = build_test_reader();
        reader.select_range(3, 2);
        let snapshot = reader.snapshot();
        assert_eq!(snapshot.selected_citation.as_deref(), Some("Genesis 1:2-3"));
        assert!(snapshot.segments[0].lowlight);
        assert!(!snapshot.segments[1].lowlight);
    }
}
