use crate::commentary::{Filter, RawRecord};
use crate::document::DocumentRecord;
use crate::reference::Reference;
use std::time::Instant;

/// Messages emitted by the renderer, the runtime and timers.
#[derive(Debug, Clone)]
pub enum Message {
    Navigate(String),
    DocumentLoaded {
        generation: u64,
        result: Result<DocumentRecord, String>,
    },
    Prefetched {
        reference: Reference,
        result: Result<DocumentRecord, String>,
    },
    RenderDocument(DocumentRecord),
    SetFilter(Filter),
    LeaveSidebarMode,
    SelectRange {
        first: u32,
        last: u32,
    },
    ClickSegment(u32),
    ClearSelection,
    Scrolled {
        offset: f32,
    },
    /// The renderer finished a layout pass; `tops` carries fresh segment
    /// positions when the layout provider does not measure on its own.
    LayoutSettled {
        tops: Option<Vec<f32>>,
    },
    Resized {
        viewport_height: f32,
        now: Instant,
    },
    Tick(Instant),
    ToggleExpanded(usize),
    SetCommentaryVisible(bool),
    CitationInputChanged {
        input: String,
        now: Instant,
    },
    SaveSource {
        citation: String,
        link_type: String,
        anchor_text: String,
        edit_id: Option<String>,
    },
    SaveNote {
        title: String,
        text: String,
        public: bool,
        edit_id: Option<String>,
    },
    SaveText {
        citation: String,
        version_title: String,
        version_source: String,
        text: Vec<String>,
    },
    /// A link or note save answered; `page` is the document it was issued on.
    Saved {
        page: Reference,
        result: Result<RawRecord, String>,
    },
    TextSaved {
        reference: Reference,
        result: Result<(), String>,
    },
    DeleteEntry(usize),
    Deleted {
        page: Reference,
        id: String,
        result: Result<(), String>,
    },
}
