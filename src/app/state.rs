use crate::authoring::CitationCheck;
use crate::cache::DocumentCache;
use crate::cancellation::RequestTracker;
use crate::commentary::{
    CommentaryEntry, Filter, FilterOutcome, FilterState, Palette, SourcesSummary,
};
use crate::config::AppConfig;
use crate::debounce::Debouncer;
use crate::document::{DocumentRecord, Segment};
use crate::reference::{Library, Reference};
use crate::scroll_map::{LayoutProvider, ScrollMap};
use crate::selection::{Lowlight, Selection, VisibleWindow};
use crate::text_utils::ShortTextLimits;

/// The document currently on screen.
#[derive(Debug, Clone)]
pub(super) struct LoadedDocument {
    pub(super) record: DocumentRecord,
    pub(super) reference: Reference,
    pub(super) segments: Vec<Segment>,
    pub(super) title: String,
}

/// Reader controller: owns all view state and recomputes derived state in
/// a fixed order after every change.
pub struct Reader<L: LayoutProvider> {
    pub(super) config: AppConfig,
    pub(super) library: Library,
    pub(super) palette: Palette,
    pub(super) limits: ShortTextLimits,
    pub(super) layout: L,
    pub(super) cache: DocumentCache,
    pub(super) tracker: RequestTracker,
    /// Breadcrumb trail of visited references.
    pub(super) thread: Vec<String>,
    pub(super) document: Option<LoadedDocument>,
    pub(super) filter: FilterState,
    /// Normalized commentary, in service order; feeds the sources panel.
    pub(super) commentary: Vec<CommentaryEntry>,
    /// Sorted entries of the collection the sidebar shows.
    pub(super) entries: Vec<CommentaryEntry>,
    pub(super) outcome: FilterOutcome,
    pub(super) segment_counts: Vec<usize>,
    pub(super) scroll_map: ScrollMap,
    pub(super) range_map: Option<ScrollMap>,
    /// Set while the renderer has not reported layout for the current data.
    pub(super) layout_pending: bool,
    pub(super) selection: Selection,
    pub(super) lowlight: Lowlight,
    pub(super) sources: SourcesSummary,
    pub(super) window: Option<VisibleWindow>,
    pub(super) scroll_top: f32,
    pub(super) panel_target: Option<usize>,
    pub(super) expanded: Option<usize>,
    pub(super) commentary_visible: bool,
    pub(super) resize_debounce: Debouncer,
    pub(super) citation_debounce: Debouncer,
    pub(super) citation_input: String,
    pub(super) citation_check: CitationCheck,
    pub(super) user_id: Option<u64>,
    pub(super) notice: Option<String>,
}

impl<L: LayoutProvider> Reader<L> {
    pub fn new(config: AppConfig, library: Library, layout: L) -> Self {
        let cache = DocumentCache::from_config(&config);
        Self::with_cache(config, library, layout, cache)
    }

    pub fn with_cache(config: AppConfig, library: Library, layout: L, cache: DocumentCache) -> Self {
        let palette = Palette::from_config(&config);
        let limits = ShortTextLimits {
            max_chars: config.short_text_chars,
            cut_at: config.short_text_cut,
        };
        let filter = FilterState::new(Filter::parse(&config.default_filter));
        let debounce = config.debounce();
        Self {
            palette,
            limits,
            layout,
            cache,
            library,
            tracker: RequestTracker::default(),
            thread: Vec::new(),
            document: None,
            filter,
            commentary: Vec::new(),
            entries: Vec::new(),
            outcome: FilterOutcome::default(),
            segment_counts: Vec::new(),
            scroll_map: ScrollMap::default(),
            range_map: None,
            layout_pending: false,
            selection: Selection::Unselected,
            lowlight: Lowlight::default(),
            sources: SourcesSummary::default(),
            window: None,
            scroll_top: 0.0,
            panel_target: None,
            expanded: None,
            commentary_visible: true,
            resize_debounce: Debouncer::new(debounce),
            citation_debounce: Debouncer::new(debounce),
            citation_input: String::new(),
            citation_check: CitationCheck::Empty,
            user_id: None,
            notice: None,
            config,
        }
    }

    /// Signed-in user, used to mark their own notes.
    pub fn set_user(&mut self, user_id: Option<u64>) {
        self.user_id = user_id;
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn reference(&self) -> Option<&Reference> {
        self.document.as_ref().map(|doc| &doc.reference)
    }

    pub fn record(&self) -> Option<&DocumentRecord> {
        self.document.as_ref().map(|doc| &doc.record)
    }

    pub fn entries(&self) -> &[CommentaryEntry] {
        &self.entries
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn filter_outcome(&self) -> &FilterOutcome {
        &self.outcome
    }

    pub fn scroll_map(&self) -> &ScrollMap {
        &self.scroll_map
    }

    /// Scroll map limited to the selected segments, when there is a selection.
    pub fn range_scroll_map(&self) -> Option<&ScrollMap> {
        self.range_map.as_ref()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn sources(&self) -> &SourcesSummary {
        &self.sources
    }

    pub fn thread(&self) -> &[String] {
        &self.thread
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub fn is_loading(&self) -> bool {
        self.tracker.in_flight()
    }

    pub fn is_layout_pending(&self) -> bool {
        self.layout_pending
    }

    pub(super) fn segment_count(&self) -> usize {
        self.document.as_ref().map_or(0, |doc| doc.segments.len())
    }
}
