//! Document records returned by the texts service and the segments built
//! from them.

use crate::commentary::RawRecord;
use crate::reference::{Library, ParseError, Reference, Section};
use serde::{Deserialize, Serialize};

/// One node of a (possibly nested) text array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum TextNode {
    Text(String),
    Nested(Vec<TextNode>),
    #[default]
    Empty,
}

impl TextNode {
    /// Flatten nested text into one string, inner parts joined by a space.
    pub fn flatten(&self) -> String {
        match self {
            TextNode::Text(text) => text.clone(),
            TextNode::Nested(children) => children
                .iter()
                .map(TextNode::flatten)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            TextNode::Empty => String::new(),
        }
    }

    /// Top-level segments: each element of an array, or the single text.
    fn segments(&self) -> Vec<String> {
        match self {
            TextNode::Nested(children) => children.iter().map(TextNode::flatten).collect(),
            TextNode::Text(text) if !text.is_empty() => vec![text.clone()],
            _ => Vec::new(),
        }
    }
}

/// A fetched text with its commentary, notes and sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentRecord {
    #[serde(rename = "ref")]
    pub reference: String,
    pub book: String,
    pub sections: Vec<Section>,
    pub to_sections: Vec<Section>,
    pub section_names: Vec<String>,
    pub text: TextNode,
    pub he: TextNode,
    pub commentary: Vec<RawRecord>,
    pub notes: Vec<RawRecord>,
    pub sheets: Vec<RawRecord>,
    pub next: Option<String>,
    pub prev: Option<String>,
    pub title: Option<String>,
    pub he_title: Option<String>,
    pub version_title: Option<String>,
    pub he_version_title: Option<String>,
    pub error: Option<String>,
}

/// One addressable unit of the base text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 1-based position within the containing section.
    pub index: u32,
    pub english: String,
    pub hebrew: String,
}

impl DocumentRecord {
    /// The reference this record describes. Structured fields win; the raw
    /// `ref` string is the fallback, read against `library` when it knows
    /// the book.
    pub fn reference(&self, library: &Library) -> Result<Reference, ParseError> {
        if self.book.is_empty() || self.section_names.is_empty() {
            return resolve(&self.reference, library);
        }
        let sections: Vec<Section> = self.sections.iter().cloned().map(Section::normalized).collect();
        let to_sections: Vec<Section> = self
            .to_sections
            .iter()
            .cloned()
            .map(Section::normalized)
            .collect();
        let to_sections = (to_sections.len() == sections.len()).then_some(to_sections);
        Reference::new(
            self.book.clone(),
            sections,
            to_sections,
            self.section_names.clone(),
        )
    }

    /// Pair English and Hebrew text into segments; the longer side decides
    /// the count.
    pub fn segments(&self) -> Vec<Segment> {
        let english = self.text.segments();
        let hebrew = self.he.segments();
        let count = english.len().max(hebrew.len());
        (0..count)
            .map(|i| Segment {
                index: i as u32 + 1,
                english: english.get(i).cloned().unwrap_or_default(),
                hebrew: hebrew.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Title shown above the text: `Genesis Chapter 4`, or the record title
    /// when no sections are known.
    pub fn page_title(&self, reference: &Reference) -> String {
        if reference.sections().is_empty() {
            return self
                .title
                .clone()
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| reference.book().to_string());
        }
        reference.section_ref().heading()
    }

    pub fn next_reference(&self, library: &Library) -> Option<Reference> {
        self.next
            .as_deref()
            .filter(|next| !next.is_empty())
            .and_then(|next| resolve(next, library).ok())
    }

    pub fn prev_reference(&self, library: &Library) -> Option<Reference> {
        self.prev
            .as_deref()
            .filter(|prev| !prev.is_empty())
            .and_then(|prev| resolve(prev, library).ok())
    }
}

fn resolve(citation: &str, library: &Library) -> Result<Reference, ParseError> {
    match Reference::parse(citation, library) {
        Err(ParseError::UnknownBook(_)) => Reference::parse_loose(citation),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis_record() -> DocumentRecord {
        serde_json::from_str(
            r#"{
                "ref": "Genesis.1",
                "book": "Genesis",
                "sections": [1],
                "toSections": [1],
                "sectionNames": ["Chapter", "Verse"],
                "text": ["In the beginning", "And the earth", "And God said"],
                "he": ["בראשית", "והארץ"],
                "commentary": [],
                "next": "Genesis 2",
                "prev": null
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn segments_pair_languages_by_position() {
        let record = genesis_record();
        let segments = record.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].index, 1);
        assert_eq!(segments[1].hebrew, "והארץ");
        assert_eq!(segments[2].hebrew, "");
    }

    #[test]
    fn nested_text_collapses_into_outer_segment() {
        let record: DocumentRecord = serde_json::from_str(
            r#"{"ref": "Rashi_on_Genesis.1", "text": [["a", "b"], ["c"], null]}"#,
        )
        .unwrap();
        let segments = record.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].english, "a b");
        assert_eq!(segments[2].english, "");
    }

    #[test]
    fn structured_fields_build_the_reference() {
        let record = genesis_record();
        let reference = record.reference(&Library::builtin()).unwrap();
        assert_eq!(reference.to_string(), "Genesis 1");
        assert_eq!(record.page_title(&reference), "Genesis Chapter 1");
        assert_eq!(
            record.next_reference(&Library::builtin()).map(|r| r.to_string()),
            Some("Genesis 2".to_string())
        );
        assert!(record.prev_reference(&Library::builtin()).is_none());
    }

    #[test]
    fn leaf_record_title_names_the_chapter() {
        let record: DocumentRecord = serde_json::from_str(
            r#"{"ref": "Genesis.4.5", "book": "Genesis", "sections": ["4", "5"],
                "sectionNames": ["Chapter", "Verse"]}"#,
        )
        .unwrap();
        let reference = record.reference(&Library::builtin()).unwrap();
        assert_eq!(reference.leaf_range(0), Some((5, 5)));
        assert_eq!(record.page_title(&reference), "Genesis Chapter 4");
    }

    #[test]
    fn raw_ref_is_the_fallback() {
        let record: DocumentRecord =
            serde_json::from_str(r#"{"ref": "Genesis_Rabbah.1.2"}"#).unwrap();
        assert_eq!(record.reference(&Library::builtin()).unwrap().to_string(), "Genesis Rabbah 1:2");
    }
}
