use super::super::state::Reader;
use super::{Effect, Stage};
use crate::commentary::{Collection, Filter};
use crate::scroll_map::LayoutProvider;
use crate::selection::Selection;
use tracing::debug;

impl<L: LayoutProvider> Reader<L> {
    pub(super) fn handle_set_filter(&mut self, filter: Filter, effects: &mut Vec<Effect>) {
        let before = self.filter.collection();
        self.filter.select(filter);
        self.apply_filter_change(before, effects);
    }

    pub(super) fn handle_leave_sidebar_mode(&mut self, effects: &mut Vec<Effect>) {
        let before = self.filter.collection();
        self.filter.leave_mode();
        self.apply_filter_change(before, effects);
    }

    fn apply_filter_change(&mut self, before: Collection, effects: &mut Vec<Effect>) {
        debug!(filter = %self.filter.current, previous = %self.filter.previous, "Filter changed");
        if self.filter.collection() != before {
            self.expanded = None;
            self.panel_target = None;
            self.commit(Stage::Sort);
        } else {
            self.commit(Stage::Filter);
        }
        self.sync_panel(effects);
    }

    pub(super) fn handle_select_range(&mut self, first: u32, last: u32, effects: &mut Vec<Effect>) {
        let count = self.segment_count() as u32;
        if count == 0 {
            return;
        }
        let first = first.clamp(1, count);
        let last = last.clamp(1, count);
        self.selection = Selection::range_of(first, last);
        debug!(first, last, "Selected segments");
        self.commit(Stage::Tracker);
        self.sync_panel(effects);
    }

    pub(super) fn handle_click_segment(&mut self, segment: u32, effects: &mut Vec<Effect>) {
        if segment == 0 || segment as usize > self.segment_count() {
            return;
        }
        self.selection.click(segment);
        debug!(segment, selection = ?self.selection, "Clicked segment");
        self.commit(Stage::Tracker);
        self.sync_panel(effects);
    }

    pub(super) fn handle_clear_selection(&mut self, effects: &mut Vec<Effect>) {
        self.selection.reset();
        self.commit(Stage::Tracker);
        self.sync_panel(effects);
    }

    pub(super) fn handle_toggle_expanded(&mut self, entry: usize, effects: &mut Vec<Effect>) {
        if self.expanded == Some(entry) {
            self.expanded = None;
            self.commit(Stage::Tracker);
            self.sync_panel(effects);
            return;
        }
        if entry >= self.entries.len() {
            return;
        }
        self.expanded = Some(entry);
        self.commit(Stage::Tracker);
        self.panel_target = Some(entry);
        effects.push(Effect::AlignPanel {
            entry,
            offset: 0.0,
            animate: true,
        });
    }

    pub(super) fn handle_set_commentary_visible(&mut self, visible: bool, effects: &mut Vec<Effect>) {
        self.commentary_visible = visible;
        if visible {
            self.panel_target = None;
            self.sync_panel(effects);
        }
    }
}
