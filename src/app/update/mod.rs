use super::messages::Message;
use super::state::Reader;
use crate::authoring::{NoteDraft, SourceDraft, TextDraft};
use crate::cancellation::CancellationToken;
use crate::commentary::{
    Collection, Filter, RawRecord, apply_filter, normalize, sort_entries, summarize,
};
use crate::document::DocumentRecord;
use crate::reference::Reference;
use crate::scroll_map::{LayoutProvider, ScrollMap, restrict_counts, visible_counts_per_segment};
use crate::selection::Lowlight;
use std::time::Instant;
use tracing::debug;

mod edits;
mod navigation;
mod scroll;
mod sidebar;

/// Describes work that must be performed outside the pure reducer.
#[derive(Debug, Clone)]
pub enum Effect {
    Fetch {
        generation: u64,
        reference: Reference,
        token: CancellationToken,
    },
    Prefetch(Reference),
    /// Ask the renderer for a layout pass; it answers with
    /// [`Message::LayoutSettled`].
    RequestLayout,
    /// Scroll the commentary panel so `entry` sits at the top, shifted by
    /// `offset`.
    AlignPanel {
        entry: usize,
        offset: f32,
        animate: bool,
    },
    /// Mutations carry the page they were issued from so a late answer
    /// never patches a different document.
    SaveLink {
        page: Reference,
        draft: SourceDraft,
    },
    SaveNote {
        page: Reference,
        draft: NoteDraft,
    },
    DeleteLink {
        page: Reference,
        id: String,
    },
    DeleteNote {
        page: Reference,
        id: String,
    },
    SaveText(TextDraft),
    Notify(String),
}

/// Derived-state stages, in the order they must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Stage {
    /// Normalize the shown collection and sort it.
    Sort,
    Filter,
    ScrollMap,
    /// Selection projection, sources panel and viewport window.
    Tracker,
}

impl<L: LayoutProvider> Reader<L> {
    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::Navigate(citation) => self.handle_navigate(&citation, &mut effects),
            Message::DocumentLoaded { generation, result } => {
                self.handle_document_loaded(generation, result, &mut effects)
            }
            Message::Prefetched { reference, result } => {
                self.handle_prefetched(reference, result)
            }
            Message::RenderDocument(record) => self.handle_direct_render(record, &mut effects),
            Message::SetFilter(filter) => self.handle_set_filter(filter, &mut effects),
            Message::LeaveSidebarMode => self.handle_leave_sidebar_mode(&mut effects),
            Message::SelectRange { first, last } => {
                self.handle_select_range(first, last, &mut effects)
            }
            Message::ClickSegment(segment) => self.handle_click_segment(segment, &mut effects),
            Message::ClearSelection => self.handle_clear_selection(&mut effects),
            Message::Scrolled { offset } => self.handle_scrolled(offset, &mut effects),
            Message::LayoutSettled { tops } => self.handle_layout_settled(tops, &mut effects),
            Message::Resized {
                viewport_height,
                now,
            } => self.handle_resized(viewport_height, now),
            Message::Tick(now) => self.handle_tick(now, &mut effects),
            Message::ToggleExpanded(entry) => self.handle_toggle_expanded(entry, &mut effects),
            Message::SetCommentaryVisible(visible) => {
                self.handle_set_commentary_visible(visible, &mut effects)
            }
            Message::CitationInputChanged { input, now } => {
                self.handle_citation_input_changed(input, now)
            }
            Message::SaveSource {
                citation,
                link_type,
                anchor_text,
                edit_id,
            } => self.handle_save_source(&citation, &link_type, anchor_text, edit_id, &mut effects),
            Message::SaveNote {
                title,
                text,
                public,
                edit_id,
            } => self.handle_save_note(&title, &text, public, edit_id, &mut effects),
            Message::SaveText {
                citation,
                version_title,
                version_source,
                text,
            } => self.handle_save_text(&citation, &version_title, &version_source, text, &mut effects),
            Message::Saved { page, result } => self.handle_saved(page, result, &mut effects),
            Message::TextSaved { reference, result } => {
                self.handle_text_saved(reference, result, &mut effects)
            }
            Message::DeleteEntry(entry) => self.handle_delete_entry(entry, &mut effects),
            Message::Deleted { page, id, result } => {
                self.handle_deleted(page, id, result, &mut effects)
            }
        }

        for effect in &effects {
            if let Effect::Notify(message) = effect {
                self.notice = Some(message.clone());
            }
        }
        effects
    }

    pub fn navigate(&mut self, citation: &str) -> Vec<Effect> {
        self.update(Message::Navigate(citation.to_string()))
    }

    /// Hand a fetch result back; responses for superseded navigations are
    /// dropped.
    pub fn deliver(&mut self, generation: u64, result: Result<DocumentRecord, String>) -> Vec<Effect> {
        self.update(Message::DocumentLoaded { generation, result })
    }

    pub fn render_document(&mut self, record: DocumentRecord) -> Vec<Effect> {
        self.update(Message::RenderDocument(record))
    }

    pub fn set_filter(&mut self, filter: Filter) -> Vec<Effect> {
        self.update(Message::SetFilter(filter))
    }

    pub fn select_range(&mut self, first: u32, last: u32) -> Vec<Effect> {
        self.update(Message::SelectRange { first, last })
    }

    pub fn click_segment(&mut self, segment: u32) -> Vec<Effect> {
        self.update(Message::ClickSegment(segment))
    }

    pub fn clear_selection(&mut self) -> Vec<Effect> {
        self.update(Message::ClearSelection)
    }

    pub fn on_scroll(&mut self, offset: f32) -> Vec<Effect> {
        self.update(Message::Scrolled { offset })
    }

    pub fn layout_settled(&mut self, tops: Option<Vec<f32>>) -> Vec<Effect> {
        self.update(Message::LayoutSettled { tops })
    }

    pub fn resize(&mut self, viewport_height: f32, now: Instant) -> Vec<Effect> {
        self.update(Message::Resized {
            viewport_height,
            now,
        })
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        self.update(Message::Tick(now))
    }

    pub fn toggle_expanded(&mut self, entry: usize) -> Vec<Effect> {
        self.update(Message::ToggleExpanded(entry))
    }

    pub fn set_commentary_visible(&mut self, visible: bool) -> Vec<Effect> {
        self.update(Message::SetCommentaryVisible(visible))
    }

    pub fn save_source(
        &mut self,
        citation: &str,
        link_type: &str,
        anchor_text: &str,
        edit_id: Option<String>,
    ) -> Vec<Effect> {
        self.update(Message::SaveSource {
            citation: citation.to_string(),
            link_type: link_type.to_string(),
            anchor_text: anchor_text.to_string(),
            edit_id,
        })
    }

    pub fn save_note(&mut self, title: &str, text: &str, public: bool, edit_id: Option<String>) -> Vec<Effect> {
        self.update(Message::SaveNote {
            title: title.to_string(),
            text: text.to_string(),
            public,
            edit_id,
        })
    }

    pub fn save_text(
        &mut self,
        citation: &str,
        version_title: &str,
        version_source: &str,
        text: Vec<String>,
    ) -> Vec<Effect> {
        self.update(Message::SaveText {
            citation: citation.to_string(),
            version_title: version_title.to_string(),
            version_source: version_source.to_string(),
            text,
        })
    }

    pub fn delete_entry(&mut self, entry: usize) -> Vec<Effect> {
        self.update(Message::DeleteEntry(entry))
    }

    /// Store a record returned by the service, replacing any entry with the
    /// same `_id`.
    pub fn insert_or_update_entry(&mut self, record: RawRecord) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.upsert(record, &mut effects);
        effects
    }

    pub fn remove_entry(&mut self, id: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.drop_entry(id, &mut effects);
        effects
    }

    /// Recompute derived state from `from` onward: sort, filter, scroll map,
    /// tracker.
    pub(super) fn commit(&mut self, from: Stage) {
        if from <= Stage::Sort {
            self.rebuild_entries();
        }
        if from <= Stage::Filter {
            let filter = match &self.filter.current {
                Filter::Category(_) => self.filter.current.clone(),
                _ => Filter::All,
            };
            self.outcome = apply_filter(&self.entries, &filter);
        }
        if from <= Stage::ScrollMap {
            self.rebuild_scroll_map();
        }
        self.refresh_tracker();
    }

    fn rebuild_entries(&mut self) {
        let Some(doc) = &self.document else {
            self.commentary.clear();
            self.entries.clear();
            return;
        };
        self.commentary = normalize(&doc.record.commentary, &self.palette);
        self.entries = match self.filter.collection() {
            Collection::Commentary => self.commentary.clone(),
            Collection::Notes => normalize(&doc.record.notes, &self.palette),
            Collection::Sheets => normalize(&doc.record.sheets, &self.palette),
        };
        sort_entries(&mut self.entries);
        if self.expanded.is_some_and(|idx| idx >= self.entries.len()) {
            self.expanded = None;
        }
        debug!(
            commentary = self.commentary.len(),
            shown = self.entries.len(),
            filter = %self.filter.current,
            "Rebuilt sidebar entries"
        );
    }

    fn rebuild_scroll_map(&mut self) {
        self.segment_counts =
            visible_counts_per_segment(&self.entries, &self.outcome, self.segment_count());
        if self.layout_pending {
            self.scroll_map = ScrollMap::default();
            return;
        }
        let tops = self.layout.segment_tops();
        self.scroll_map =
            ScrollMap::build(&tops, &self.segment_counts, self.config.per_entry_height);
        debug!(entries = self.scroll_map.len(), "Rebuilt scroll map");
    }

    fn refresh_tracker(&mut self) {
        let range = self.selection.range();
        self.lowlight = Lowlight::project(
            self.selection,
            self.segment_count(),
            &self.entries,
            self.expanded,
        );
        self.range_map = match range {
            Some((first, last)) if !self.layout_pending => {
                let counts = restrict_counts(&self.segment_counts, first, last);
                let tops = self.layout.segment_tops();
                Some(ScrollMap::build(
                    &tops,
                    &counts,
                    self.config.per_entry_height,
                ))
            }
            _ => None,
        };
        self.sources = summarize(&self.commentary, range, &self.filter.current, &self.palette);
        self.refresh_window();
    }
}
