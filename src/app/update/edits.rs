use super::super::state::Reader;
use super::{Effect, Stage};
use crate::authoring::{CitationCheck, NoteDraft, SourceDraft, TextDraft, ValidationError};
use crate::commentary::{Filter, RawRecord};
use crate::reference::Reference;
use crate::scroll_map::LayoutProvider;
use crate::text_utils::normalize_input;
use std::time::Instant;
use tracing::{debug, info, warn};

impl<L: LayoutProvider> Reader<L> {
    pub(super) fn handle_citation_input_changed(&mut self, input: String, now: Instant) {
        if input.trim().is_empty() {
            self.citation_debounce.cancel();
            self.citation_check = CitationCheck::Empty;
        } else {
            self.citation_debounce.schedule(now);
        }
        self.citation_input = input;
    }

    pub(super) fn handle_save_source(
        &mut self,
        citation: &str,
        link_type: &str,
        anchor_text: String,
        edit_id: Option<String>,
        effects: &mut Vec<Effect>,
    ) {
        let (Some(page), Some(anchor)) = (self.page(), self.selected_reference()) else {
            effects.push(Effect::Notify("No text is open.".to_string()));
            return;
        };
        let target = match Reference::parse(&normalize_input(citation), &self.library) {
            Ok(target) => target,
            Err(err) => {
                effects.push(Effect::Notify(ValidationError::from(err).to_string()));
                return;
            }
        };

        let mut draft = SourceDraft::new(&anchor, &target, link_type);
        draft.anchor_text = anchor_text;
        draft.id = edit_id;
        if let Err(err) = draft.validate() {
            effects.push(Effect::Notify(err.to_string()));
            return;
        }
        info!(anchor = %anchor, target = %target, kind = link_type, "Saving source");
        effects.push(Effect::SaveLink { page, draft });
    }

    pub(super) fn handle_save_note(
        &mut self,
        title: &str,
        text: &str,
        public: bool,
        edit_id: Option<String>,
        effects: &mut Vec<Effect>,
    ) {
        let (Some(page), Some(anchor)) = (self.page(), self.selected_reference()) else {
            effects.push(Effect::Notify("No text is open.".to_string()));
            return;
        };
        let mut draft = NoteDraft::new(&anchor, title, text, public);
        draft.id = edit_id;
        if let Err(err) = draft.validate() {
            effects.push(Effect::Notify(err.to_string()));
            return;
        }

        if self.filter.current != Filter::Notes {
            self.handle_set_filter(Filter::Notes, effects);
        }
        info!(anchor = %anchor, public, "Saving note");
        effects.push(Effect::SaveNote { page, draft });
    }

    /// An empty citation stores the text for the open page.
    pub(super) fn handle_save_text(
        &mut self,
        citation: &str,
        version_title: &str,
        version_source: &str,
        text: Vec<String>,
        effects: &mut Vec<Effect>,
    ) {
        let citation = normalize_input(citation);
        let reference = if citation.is_empty() {
            match self.page() {
                Some(page) => page.section_ref(),
                None => {
                    effects.push(Effect::Notify("No text is open.".to_string()));
                    return;
                }
            }
        } else {
            match Reference::parse(&citation, &self.library) {
                Ok(reference) => reference,
                Err(err) => {
                    effects.push(Effect::Notify(ValidationError::from(err).to_string()));
                    return;
                }
            }
        };

        let draft = TextDraft::new(&reference, version_title, version_source, text);
        if let Err(err) = draft.validate() {
            debug!(code = err.code(), "Rejected text draft");
            effects.push(Effect::Notify(err.to_string()));
            return;
        }
        info!(reference = %reference, version = %draft.version_title, "Saving text");
        effects.push(Effect::SaveText(draft));
    }

    /// On success the whole document cache is dropped and the saved
    /// reference reloaded.
    pub(super) fn handle_text_saved(
        &mut self,
        reference: Reference,
        result: Result<(), String>,
        effects: &mut Vec<Effect>,
    ) {
        if let Err(err) = result {
            warn!(reference = %reference, %err, "Text save failed");
            effects.push(Effect::Notify(format!(
                "Sorry, there was an error saving this text: {err}"
            )));
            return;
        }
        self.cache.invalidate_all();
        effects.push(Effect::Notify("Text saved.".to_string()));
        self.navigate_to(reference, effects);
    }

    pub(super) fn handle_saved(
        &mut self,
        page: Reference,
        result: Result<RawRecord, String>,
        effects: &mut Vec<Effect>,
    ) {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, "Save failed");
                effects.push(Effect::Notify(format!("Sorry, there was an error saving: {err}")));
                return;
            }
        };
        if let Some(error) = &record.error {
            warn!(%error, "Service rejected the save");
            effects.push(Effect::Notify(error.clone()));
            return;
        }
        if !self.shows(&page) {
            debug!(page = %page, "Save answered after leaving its page");
            self.cache.invalidate(&page);
            return;
        }

        if record.kind.as_deref() != Some("note") && self.filter.current != Filter::All {
            self.filter.select(Filter::All);
        }
        self.upsert(record, effects);
    }

    pub(super) fn handle_delete_entry(&mut self, entry: usize, effects: &mut Vec<Effect>) {
        let Some(target) = self.entries.get(entry) else {
            return;
        };
        let Some(id) = target.id.clone() else {
            effects.push(Effect::Notify("This entry can't be deleted.".to_string()));
            return;
        };
        let note = target.is_note();
        let Some(page) = self.page() else {
            return;
        };
        debug!(%id, note, "Deleting entry");
        if note {
            effects.push(Effect::DeleteNote { page, id });
        } else {
            effects.push(Effect::DeleteLink { page, id });
        }
    }

    pub(super) fn handle_deleted(
        &mut self,
        page: Reference,
        id: String,
        result: Result<(), String>,
        effects: &mut Vec<Effect>,
    ) {
        if let Err(err) = result {
            warn!(%id, %err, "Delete failed");
            effects.push(Effect::Notify(format!("Sorry, there was an error deleting: {err}")));
            return;
        }
        if !self.shows(&page) {
            debug!(page = %page, %id, "Delete answered after leaving its page");
            self.cache.invalidate(&page);
            return;
        }
        let note = self
            .entries
            .iter()
            .any(|entry| entry.id.as_deref() == Some(id.as_str()) && entry.is_note());
        if self.drop_entry(&id, effects) {
            let message = if note { "Note deleted." } else { "Source deleted." };
            effects.push(Effect::Notify(message.to_string()));
        }
    }

    /// Replace the record with the same `_id` in the shown collection, or
    /// append it. The saved entry is expanded and brought into view.
    pub(super) fn upsert(&mut self, record: RawRecord, effects: &mut Vec<Effect>) {
        let notes_mode = self.filter.current == Filter::Notes;
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        let collection = if notes_mode {
            &mut doc.record.notes
        } else {
            &mut doc.record.commentary
        };
        let id = record.id.clone();
        let existing = id
            .as_deref()
            .and_then(|id| collection.iter().position(|r| r.id.as_deref() == Some(id)));
        match existing {
            Some(pos) => collection[pos] = record,
            None => collection.push(record),
        }
        self.cache.save(&doc.reference, &doc.record);
        debug!(id = ?id, replaced = existing.is_some(), notes_mode, "Stored saved record");

        self.expanded = None;
        self.commit(Stage::Sort);

        let position = id.as_deref().and_then(|id| {
            self.entries
                .iter()
                .position(|entry| entry.id.as_deref() == Some(id))
        });
        match position {
            Some(entry) => self.handle_toggle_expanded(entry, effects),
            None => self.sync_panel(effects),
        }
    }

    /// Remove the record with `id` from every collection. Returns whether
    /// anything was removed.
    pub(super) fn drop_entry(&mut self, id: &str, effects: &mut Vec<Effect>) -> bool {
        let Some(doc) = self.document.as_mut() else {
            return false;
        };
        let before = doc.record.commentary.len() + doc.record.notes.len() + doc.record.sheets.len();
        for collection in [
            &mut doc.record.commentary,
            &mut doc.record.notes,
            &mut doc.record.sheets,
        ] {
            collection.retain(|record| record.id.as_deref() != Some(id));
        }
        let after = doc.record.commentary.len() + doc.record.notes.len() + doc.record.sheets.len();
        if before == after {
            debug!(%id, "No entry to remove");
            return false;
        }
        self.cache.save(&doc.reference, &doc.record);

        self.expanded = None;
        self.panel_target = None;
        self.commit(Stage::Sort);
        self.sync_panel(effects);
        true
    }

    fn page(&self) -> Option<Reference> {
        self.document.as_ref().map(|doc| doc.reference.clone())
    }

    fn shows(&self, page: &Reference) -> bool {
        self.document.as_ref().is_some_and(|doc| doc.reference == *page)
    }

    /// The page reference narrowed to the selected segments.
    fn selected_reference(&self) -> Option<Reference> {
        let doc = self.document.as_ref()?;
        let reference = match self.selection.range() {
            Some((first, last)) => doc.reference.with_leaf_range(first, last),
            None => None,
        };
        Some(reference.unwrap_or_else(|| doc.reference.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::state::Reader;
    use super::Effect;
    use crate::app::Message;
    use crate::cache::DocumentCache;
    use crate::commentary::{Filter, RawRecord};
    use crate::config::AppConfig;
    use crate::document::DocumentRecord;
    use crate::reference::{Library, Reference};
    use crate::scroll_map::FixedLayout;

    fn build_test_reader() -> Reader<FixedLayout> {
        let mut reader = Reader::with_cache(
            AppConfig::default(),
            Library::builtin(),
            FixedLayout::new(vec![0.0, 100.0, 250.0], 600.0),
            DocumentCache::in_memory(),
        );
        let record: DocumentRecord = serde_json::from_value(serde_json::json!({
            "ref": "Genesis 1",
            "text": ["one", "two", "three"],
            "commentary": [
                {"_id": "a", "anchorVerse": 1, "commentator": "Rashi", "category": "Commentary", "text": "r1"},
            ],
        }))
        .unwrap();
        reader.render_document(record);
        reader.layout_settled(None);
        reader
    }

    fn genesis_one() -> Reference {
        Reference::parse("Genesis 1", &Library::builtin()).unwrap()
    }

    fn link(id: &str, anchor: u32, text: &str) -> RawRecord {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "anchorVerse": anchor,
            "commentator": "Genesis Rabbah",
            "category": "Midrash",
            "type": "midrash",
            "text": text,
        }))
        .unwrap()
    }

    #[test]
    fn save_source_links_the_selection_to_the_target() {
        let mut reader = build_test_reader();
        reader.select_range(2, 3);
        let effects = reader.save_source("Genesis Rabbah 3:4", "midrash", "", None);
        match effects.as_slice() {
            [Effect::SaveLink { page, draft }] => {
                assert_eq!(page.to_string(), "Genesis 1");
                assert_eq!(draft.refs, vec!["Genesis.1.2-3", "Genesis_Rabbah.3.4"]);
                assert_eq!(draft.link_type, "midrash");
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn invalid_target_is_reported() {
        let mut reader = build_test_reader();
        let effects = reader.save_source("Nowhere 1", "commentary", "", None);
        assert!(matches!(effects.as_slice(), [Effect::Notify(_)]));
    }

    #[test]
    fn saving_a_note_enters_notes_mode_first() {
        let mut reader = build_test_reader();
        let effects = reader.save_note("", "  ", false, None);
        assert!(matches!(effects.as_slice(), [Effect::Notify(_)]));
        assert_eq!(reader.filter_state().current, Filter::All);

        let effects = reader.save_note("Light", "Day one", true, None);
        assert!(matches!(effects.last(), Some(Effect::SaveNote { .. })));
        assert_eq!(reader.filter_state().current, Filter::Notes);
    }

    #[test]
    fn saved_source_resets_filter_and_is_inserted() {
        let mut reader = build_test_reader();
        reader.set_filter(Filter::Category("Commentary".to_string()));

        let effects = reader.update(Message::Saved {
            page: genesis_one(),
            result: Ok(link("m", 2, "first")),
        });
        assert_eq!(reader.filter_state().current, Filter::All);
        assert_eq!(reader.entries().len(), 2);
        assert!(matches!(effects.as_slice(), [Effect::AlignPanel { entry: 1, .. }]));

        reader.insert_or_update_entry(link("m", 2, "edited"));
        assert_eq!(reader.entries().len(), 2);
        assert_eq!(reader.entries()[1].english, "edited");
    }

    #[test]
    fn deleting_removes_the_entry_and_reports_it() {
        let mut reader = build_test_reader();
        let effects = reader.delete_entry(0);
        assert!(matches!(effects.as_slice(), [Effect::DeleteLink { id, .. }] if id == "a"));
        assert_eq!(reader.entries().len(), 1);

        let effects = reader.remove_entry("a");
        assert!(reader.entries().is_empty());
        assert!(effects.is_empty());
        assert!(reader.remove_entry("a").is_empty());
    }

    #[test]
    fn edits_are_written_back_to_the_cache() {
        let mut reader = build_test_reader();
        reader.insert_or_update_entry(link("m", 2, "first"));
        reader.remove_entry("a");

        reader.navigate("Exodus 1");
        let effects = reader.navigate("Genesis 1");
        assert!(effects.iter().all(|e| !matches!(e, Effect::Fetch { .. })));
        let ids: Vec<_> = reader.entries().iter().map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("m")]);
    }

    #[test]
    fn late_mutation_answers_leave_the_new_page_alone() {
        let mut reader = build_test_reader();
        reader.insert_or_update_entry(link("x", 1, "cached"));
        assert!(reader.cache().contains(&genesis_one()));
        let next: DocumentRecord = serde_json::from_value(serde_json::json!({
            "ref": "Genesis 2",
            "text": ["one", "two"],
            "commentary": [
                {"_id": "b", "anchorVerse": 1, "commentator": "Rashi", "category": "Commentary", "text": "r2"},
            ],
        }))
        .unwrap();
        reader.render_document(next);

        let effects = reader.update(Message::Saved {
            page: genesis_one(),
            result: Ok(link("m", 2, "late")),
        });
        assert!(effects.is_empty());
        let effects = reader.update(Message::Deleted {
            page: genesis_one(),
            id: "b".to_string(),
            result: Ok(()),
        });
        assert!(effects.is_empty());

        let ids: Vec<_> = reader.entries().iter().map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("b")]);
        assert!(!reader.cache().contains(&genesis_one()));
    }

    #[test]
    fn saving_a_text_validates_then_reloads_without_the_cache() {
        let mut reader = build_test_reader();
        let effects = reader.save_text("", "", "site", vec!["In the".into()]);
        assert!(matches!(effects.as_slice(), [Effect::Notify(m)] if m == "Please give a version title."));

        let effects = reader.save_text("", "JPS", "site", vec!["In the".into()]);
        let draft = match effects.as_slice() {
            [Effect::SaveText(draft)] => draft.clone(),
            other => panic!("unexpected effects: {other:?}"),
        };
        assert_eq!(draft.reference.to_string(), "Genesis 1");

        reader.remove_entry("a");
        assert!(reader.cache().contains(&genesis_one()));

        let effects = reader.update(Message::TextSaved {
            reference: draft.reference,
            result: Ok(()),
        });
        assert!(reader.cache().is_empty());
        assert!(matches!(effects.first(), Some(Effect::Notify(m)) if m == "Text saved."));
        assert!(matches!(effects.last(), Some(Effect::Fetch { reference, .. }) if reference.to_string() == "Genesis 1"));
        assert!(reader.is_loading());
    }
}
