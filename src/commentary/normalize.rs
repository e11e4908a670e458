use super::{Anchor, CommentaryEntry, EntryKind, Language, Palette, RawRecord, Visibility};
use crate::reference::Reference;
use std::collections::HashMap;
use tracing::debug;

const QUOTING_COMMENTARY: &str = "Quoting Commentary";

/// Turn raw service records into entries.
///
/// Records carrying an error marker are skipped and consume no colour.
/// Each commentator takes the next palette colour the first time it is seen,
/// wrapping around once the palette is exhausted.
pub fn normalize(records: &[RawRecord], palette: &Palette) -> Vec<CommentaryEntry> {
    let mut colors: HashMap<String, usize> = HashMap::new();
    let mut entries = Vec::with_capacity(records.len());

    for (source_index, raw) in records.iter().enumerate() {
        if let Some(error) = &raw.error {
            debug!(source_index, %error, "Dropping commentary record with error marker");
            continue;
        }

        let commentator = raw.commentator.clone().unwrap_or_default();
        let seen = colors.len();
        let color_index = *colors
            .entry(commentator.clone())
            .or_insert_with(|| seen % palette.len().max(1));

        entries.push(build_entry(raw, source_index, commentator, color_index));
    }

    entries
}

fn build_entry(
    raw: &RawRecord,
    source_index: usize,
    commentator: String,
    color_index: usize,
) -> CommentaryEntry {
    let kind = EntryKind::from_type(raw.kind.as_deref());
    let text = raw.text.flatten();
    let he = raw.he.flatten();
    let title = raw.title.clone().filter(|title| !title.is_empty());

    let (english, hebrew) = match kind {
        EntryKind::Note => {
            let english = match &title {
                Some(title) => format!("{title} - {text}"),
                None => text,
            };
            (english.clone(), english)
        }
        EntryKind::Sheet => (text.clone(), text),
        EntryKind::Commentary => (text, he),
    };

    let language = match (english.is_empty(), hebrew.is_empty()) {
        (true, true) => Language::Empty,
        (true, false) => Language::HeOnly,
        (false, true) => Language::EnOnly,
        (false, false) => Language::Bilingual,
    };

    let mut category = raw.category.clone().unwrap_or_else(|| match kind {
        EntryKind::Note => "Notes".to_string(),
        EntryKind::Sheet => "Sheets".to_string(),
        EntryKind::Commentary => String::new(),
    });
    if kind == EntryKind::Commentary && category == "Commentary" && commentator.contains(" on ") {
        category = QUOTING_COMMENTARY.to_string();
    }

    let source_ref_text = raw.source_ref.clone().unwrap_or_default();
    let source_ref = if source_ref_text.is_empty() {
        None
    } else {
        Reference::parse_loose(&source_ref_text).ok()
    };

    let visibility = (kind == EntryKind::Note).then(|| {
        if raw.public.unwrap_or(false) {
            Visibility::Public
        } else {
            Visibility::Private
        }
    });

    CommentaryEntry {
        id: raw.id.clone(),
        source_index,
        anchor: Anchor::from_loose(raw.anchor_verse.as_ref()),
        source_ref,
        source_ref_text,
        he_commentator: raw
            .he_commentator
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| commentator.clone()),
        commentator,
        category,
        kind,
        link_type: raw.kind.clone().unwrap_or_default(),
        english,
        hebrew,
        anchor_text: raw.anchor_text.clone().unwrap_or_default(),
        order_within_source: raw
            .commentary_num
            .as_ref()
            .and_then(|n| n.leading_int())
            .unwrap_or(0),
        owner: raw.owner,
        visibility,
        title,
        color_index,
        language,
    }
}
