use super::super::state::{LoadedDocument, Reader};
use super::{Effect, Stage};
use crate::document::DocumentRecord;
use crate::reference::Reference;
use crate::scroll_map::LayoutProvider;
use crate::selection::Selection;
use crate::text_utils::normalize_input;
use tracing::{debug, info, warn};

impl<L: LayoutProvider> Reader<L> {
    pub(super) fn handle_navigate(&mut self, citation: &str, effects: &mut Vec<Effect>) {
        let citation = normalize_input(citation);
        let reference = match Reference::parse(&citation, &self.library) {
            Ok(reference) => reference,
            Err(err) => {
                warn!(%citation, code = err.code(), "Rejected citation");
                effects.push(Effect::Notify(err.to_string()));
                return;
            }
        };
        self.navigate_to(reference, effects);
    }

    /// Serve `reference` from the cache or start a fetch for it.
    pub(super) fn navigate_to(&mut self, reference: Reference, effects: &mut Vec<Effect>) {
        let ticket = self.tracker.begin();
        info!(reference = %reference, generation = ticket.generation, "Navigating");

        if let Some(record) = self.cache.get(&reference) {
            debug!(reference = %reference, "Serving document from cache");
            self.tracker.finish(ticket.generation);
            self.handle_render_document(record, effects);
            return;
        }

        effects.push(Effect::Fetch {
            generation: ticket.generation,
            reference,
            token: ticket.token,
        });
    }

    pub(super) fn handle_document_loaded(
        &mut self,
        generation: u64,
        result: Result<DocumentRecord, String>,
        effects: &mut Vec<Effect>,
    ) {
        if !self.tracker.finish(generation) {
            debug!(generation, "Dropped stale document response");
            return;
        }

        match result {
            Ok(record) => {
                if let Some(error) = record.error.as_deref().filter(|e| !e.is_empty()) {
                    warn!(generation, %error, "Text service returned an error");
                    effects.push(Effect::Notify(error.to_string()));
                    return;
                }
                if let Ok(reference) = record.reference(&self.library) {
                    self.cache.save(&reference, &record);
                }
                self.handle_render_document(record, effects);
            }
            Err(err) => {
                warn!(generation, %err, "Failed to load document");
                effects.push(Effect::Notify(format!("Couldn't load text: {err}")));
            }
        }
    }

    pub(super) fn handle_prefetched(
        &mut self,
        reference: Reference,
        result: Result<DocumentRecord, String>,
    ) {
        match result {
            Ok(record) if record.error.is_none() => {
                debug!(reference = %reference, "Prefetched document");
                self.cache.save(&reference, &record);
            }
            Ok(_) | Err(_) => {
                debug!(reference = %reference, "Prefetch failed");
                self.cache.abandon_prefetch(&reference);
            }
        }
    }

    /// A document handed over directly supersedes any navigation still
    /// waiting on the service.
    pub(super) fn handle_direct_render(&mut self, record: DocumentRecord, effects: &mut Vec<Effect>) {
        if self.tracker.in_flight() {
            debug!("Direct render supersedes the in-flight fetch");
            self.tracker.cancel_active();
        }
        self.handle_render_document(record, effects);
    }

    pub(super) fn handle_render_document(
        &mut self,
        record: DocumentRecord,
        effects: &mut Vec<Effect>,
    ) {
        let reference = match record.reference(&self.library) {
            Ok(reference) => reference,
            Err(err) => {
                warn!(reference = %record.reference, code = err.code(), "Document has an unreadable reference");
                effects.push(Effect::Notify(err.to_string()));
                return;
            }
        };

        self.record_visit(&reference);
        let neighbours = [
            record.next_reference(&self.library),
            record.prev_reference(&self.library),
        ];
        let segments = record.segments();
        let title = record.page_title(&reference);

        self.selection = match reference.leaf_range(segments.len() as u32) {
            Some((first, last)) => Selection::range_of(first, last),
            None => Selection::Unselected,
        };
        self.expanded = None;
        self.panel_target = None;
        self.scroll_top = 0.0;
        self.document = Some(LoadedDocument {
            record,
            reference,
            segments,
            title,
        });
        self.layout_pending = true;
        self.commit(Stage::Sort);
        effects.push(Effect::RequestLayout);

        if let Some(doc) = &self.document {
            info!(
                reference = %doc.reference,
                segments = doc.segments.len(),
                entries = self.entries.len(),
                "Rendered document"
            );
        }

        for neighbour in neighbours.into_iter().flatten() {
            if self.cache.prefetch(&neighbour) {
                effects.push(Effect::Prefetch(neighbour));
            }
        }
    }

    /// Truncate the thread after an earlier visit to `reference`, or append it.
    fn record_visit(&mut self, reference: &Reference) {
        let key = reference.to_string();
        match self.thread.iter().position(|visited| *visited == key) {
            Some(pos) => self.thread.truncate(pos + 1),
            None => self.thread.push(key),
        }
    }
}
