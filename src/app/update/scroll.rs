use super::super::state::Reader;
use super::{Effect, Stage};
use crate::authoring::check_citation;
use crate::scroll_map::LayoutProvider;
use crate::selection::VisibleWindow;
use std::time::Instant;
use tracing::{debug, trace};

impl<L: LayoutProvider> Reader<L> {
    pub(super) fn handle_scrolled(&mut self, offset: f32, effects: &mut Vec<Effect>) {
        if offset.is_finite() {
            self.scroll_top = offset.max(0.0);
        }
        self.refresh_window();
        self.sync_panel(effects);
    }

    pub(super) fn handle_layout_settled(&mut self, tops: Option<Vec<f32>>, effects: &mut Vec<Effect>) {
        if let Some(tops) = tops {
            self.layout.record_tops(tops);
        }
        self.layout_pending = false;
        self.commit(Stage::ScrollMap);
        self.panel_target = None;
        self.sync_panel(effects);
    }

    pub(super) fn handle_resized(&mut self, viewport_height: f32, now: Instant) {
        self.layout.record_viewport_height(viewport_height);
        self.resize_debounce.schedule(now);
    }

    pub(super) fn handle_tick(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        if self.resize_debounce.fire_if_due(now) && !self.layout_pending {
            debug!("Rebuilding scroll map after resize");
            self.commit(Stage::ScrollMap);
            self.sync_panel(effects);
        }
        if self.citation_debounce.fire_if_due(now) {
            self.citation_check = check_citation(&self.citation_input, &self.library);
            debug!(input = %self.citation_input, check = ?self.citation_check, "Checked citation");
        }
    }

    pub(super) fn refresh_window(&mut self) {
        if self.document.is_none() || self.layout_pending {
            self.window = None;
            return;
        }
        self.window = VisibleWindow::from_tops(
            &self.layout.segment_tops(),
            self.scroll_top,
            self.layout.viewport_height(),
            self.config.viewport_top_inset,
        );
    }

    /// Keep the commentary panel in step with the base text.
    ///
    /// With a selection, the first undimmed entry tracks the first selected
    /// segment. Otherwise the scroll map picks the entry for the window top.
    pub(super) fn sync_panel(&mut self, effects: &mut Vec<Effect>) {
        if self.document.is_none()
            || self.is_loading()
            || self.layout_pending
            || !self.commentary_visible
            || self.expanded.is_some()
            || self.outcome.visible_count == 0
        {
            return;
        }

        if self.lowlight.is_active() {
            let tops = self.layout.segment_tops();
            let offset = self
                .lowlight
                .segments
                .iter()
                .position(|dimmed| !dimmed)
                .and_then(|idx| tops.get(idx))
                .map_or(0.0, |top| self.scroll_top - top + self.config.panel_offset);
            let first = (0..self.entries.len())
                .find(|&idx| self.outcome.is_visible(idx) && !self.lowlight.entry_dimmed(idx));
            if let Some(entry) = first {
                self.panel_target = Some(entry);
                effects.push(Effect::AlignPanel {
                    entry,
                    offset,
                    animate: false,
                });
            }
            return;
        }

        let window_top = self.scroll_top + self.config.viewport_top_inset;
        let Some(entry) = self
            .scroll_map
            .entry_at(window_top)
            .and_then(|k| self.outcome.visible_indices().nth(k))
        else {
            return;
        };
        if self.panel_target == Some(entry) {
            return;
        }
        trace!(entry, window_top, "Aligning commentary panel");
        self.panel_target = Some(entry);
        effects.push(Effect::AlignPanel {
            entry,
            offset: self.config.panel_offset,
            animate: false,
        });
    }
}
