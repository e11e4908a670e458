mod messages;
mod runtime;
mod state;
mod update;
mod view;

pub use messages::Message;
pub use runtime::Runtime;
pub use state::Reader;
pub use update::Effect;
pub use view::{EntryView, ReaderSnapshot, SegmentView, SidebarState, SidebarView};

use crate::config::AppConfig;
use crate::document::DocumentRecord;
use crate::reference::Library;
use crate::scroll_map::FixedLayout;

/// Render a document offline with fixed segment positions and settle its
/// layout, the way a renderer would after its first pass.
pub fn render_offline(
    record: DocumentRecord,
    config: AppConfig,
    library: Library,
    tops: Vec<f32>,
    viewport_height: f32,
) -> Reader<FixedLayout> {
    let mut reader = Reader::with_cache(
        config,
        library,
        FixedLayout::new(tops, viewport_height),
        crate::cache::DocumentCache::in_memory(),
    );
    reader.render_document(record);
    reader.layout_settled(None);
    reader
}
