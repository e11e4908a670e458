//! Add-source, add-note and add-text drafts and their validation.

use crate::reference::{Library, ParseError, Reference};
use crate::text_utils::{is_hebrew, normalize_input};
use serde::Serialize;
use std::fmt;

pub const COMMUNITY_TRANSLATION: &str = "Sefaria Community Translation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingRefs,
    MissingNoteText,
    MissingVersionTitle,
    MissingVersionSource,
    HebrewCommunityTranslation,
    InvalidCitation(ParseError),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingRefs => "missing_refs",
            ValidationError::MissingNoteText => "missing_note_text",
            ValidationError::MissingVersionTitle => "missing_version_title",
            ValidationError::MissingVersionSource => "missing_version_source",
            ValidationError::HebrewCommunityTranslation => "hebrew_community_translation",
            ValidationError::InvalidCitation(_) => "invalid_citation",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingRefs => write!(f, "Didn't receive a source or refs."),
            ValidationError::MissingNoteText => write!(f, "Please enter a note text."),
            ValidationError::MissingVersionTitle => write!(f, "Please give a version title."),
            ValidationError::MissingVersionSource => {
                write!(f, "Please indicate where this text was copied from.")
            }
            ValidationError::HebrewCommunityTranslation => write!(
                f,
                "\"Original Translations\" should not be Hebrew. Is this actually a copied text?"
            ),
            ValidationError::InvalidCitation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ParseError> for ValidationError {
    fn from(err: ParseError) -> Self {
        ValidationError::InvalidCitation(err)
    }
}

/// A link between the selected passage and another text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDraft {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub refs: Vec<String>,
    #[serde(rename = "anchorText")]
    pub anchor_text: String,
    #[serde(rename = "type")]
    pub link_type: String,
}

impl SourceDraft {
    pub fn new(anchor: &Reference, target: &Reference, link_type: &str) -> Self {
        Self {
            id: None,
            refs: vec![anchor.url(), target.url()],
            anchor_text: String::new(),
            link_type: link_type.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.refs.len() != 2 || self.refs.iter().any(|r| r.trim().is_empty()) {
            return Err(ValidationError::MissingRefs);
        }
        Ok(())
    }
}

/// A user note attached to the selected passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteDraft {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "anchorText")]
    pub anchor_text: String,
    #[serde(rename = "type")]
    kind: &'static str,
    pub title: String,
    pub text: String,
    pub public: bool,
}

impl NoteDraft {
    pub fn new(anchor: &Reference, title: &str, text: &str, public: bool) -> Self {
        Self {
            id: None,
            reference: anchor.url(),
            anchor_text: String::new(),
            kind: "note",
            title: title.trim().to_string(),
            text: text.trim().to_string(),
            public,
        }
    }

    /// Titles are optional; text is not.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.is_empty() {
            return Err(ValidationError::MissingNoteText);
        }
        Ok(())
    }

    pub fn is_hebrew(&self) -> bool {
        is_hebrew(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextLanguage {
    En,
    He,
}

/// A new text or translation for a passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDraft {
    #[serde(skip)]
    pub reference: Reference,
    pub version_title: String,
    pub version_source: String,
    pub language: TextLanguage,
    pub text: Vec<String>,
}

impl TextDraft {
    /// Language follows the script of the entered text.
    pub fn new(reference: &Reference, version_title: &str, version_source: &str, text: Vec<String>) -> Self {
        let language = if is_hebrew(&text.join(" ")) {
            TextLanguage::He
        } else {
            TextLanguage::En
        };
        Self {
            reference: reference.clone(),
            version_title: version_title.trim().to_string(),
            version_source: version_source.trim().to_string(),
            language,
            text,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version_title.is_empty() {
            return Err(ValidationError::MissingVersionTitle);
        }
        if self.version_source.is_empty() {
            return Err(ValidationError::MissingVersionSource);
        }
        if self.language == TextLanguage::He && self.version_title == COMMUNITY_TRANSLATION {
            return Err(ValidationError::HebrewCommunityTranslation);
        }
        Ok(())
    }
}

/// Outcome of checking a citation typed into an authoring form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationCheck {
    Empty,
    Valid(Reference),
    /// The book is not in the library; the form offers to add it.
    UnknownBook(String),
    Invalid(ParseError),
}

impl CitationCheck {
    pub fn message(&self) -> String {
        match self {
            CitationCheck::Empty => String::new(),
            CitationCheck::Valid(reference) => reference.to_string(),
            CitationCheck::UnknownBook(book) => format!("\"{book}\" is not in the library. Add Text?"),
            CitationCheck::Invalid(err) => err.to_string(),
        }
    }
}

pub fn check_citation(input: &str, library: &Library) -> CitationCheck {
    let input = normalize_input(input);
    if input.is_empty() {
        return CitationCheck::Empty;
    }
    match Reference::parse(&input, library) {
        Ok(reference) => CitationCheck::Valid(reference),
        Err(ParseError::UnknownBook(book)) => CitationCheck::UnknownBook(book),
        Err(err) => CitationCheck::Invalid(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(citation: &str) -> Reference {
        Reference::parse(citation, &Library::builtin()).unwrap()
    }

    #[test]
    fn source_needs_two_refs() {
        let draft = SourceDraft::new(&verse("Genesis 1:3"), &verse("Genesis Rabbah 3:4"), "midrash");
        assert_eq!(draft.refs, vec!["Genesis.1.3", "Genesis_Rabbah.3.4"]);
        assert!(draft.validate().is_ok());

        let mut broken = draft.clone();
        broken.refs.pop();
        assert_eq!(broken.validate(), Err(ValidationError::MissingRefs));
    }

    #[test]
    fn note_requires_text_but_not_a_title() {
        let empty = NoteDraft::new(&verse("Genesis 1:3"), "Title", "  ", false);
        assert_eq!(empty.validate(), Err(ValidationError::MissingNoteText));
        let untitled = NoteDraft::new(&verse("Genesis 1:3"), "", "Light", true);
        assert!(untitled.validate().is_ok());
        assert!(!untitled.is_hebrew());

        let json = serde_json::to_value(&untitled).unwrap();
        assert_eq!(json["type"], "note");
        assert_eq!(json["ref"], "Genesis.1.3");
        assert!(json.get("_id").is_none());
    }

    #[test]
    fn text_draft_rules() {
        let reference = verse("Genesis 1");
        let missing_title = TextDraft::new(&reference, "", "site", vec!["In the".into()]);
        assert_eq!(missing_title.validate(), Err(ValidationError::MissingVersionTitle));

        let missing_source = TextDraft::new(&reference, "JPS", "", vec!["In the".into()]);
        assert_eq!(missing_source.validate(), Err(ValidationError::MissingVersionSource));

        let hebrew = TextDraft::new(&reference, COMMUNITY_TRANSLATION, "site", vec!["בראשית".into()]);
        assert_eq!(hebrew.language, TextLanguage::He);
        assert_eq!(
            hebrew.validate().map_err(|e| e.code()),
            Err("hebrew_community_translation")
        );

        let ok = TextDraft::new(&reference, COMMUNITY_TRANSLATION, "site", vec!["In the".into()]);
        assert!(ok.validate().is_ok());
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["versionTitle"], COMMUNITY_TRANSLATION);
        assert_eq!(json["language"], "en");
        assert!(json.get("reference").is_none());
    }

    #[test]
    fn citation_checks() {
        let library = Library::builtin();
        assert_eq!(check_citation("  ", &library), CitationCheck::Empty);
        assert!(matches!(check_citation("Exodus 3:1", &library), CitationCheck::Valid(_)));
        assert_eq!(
            check_citation("Tosefta Berakhot 1:1", &library),
            CitationCheck::UnknownBook("Tosefta Berakhot".to_string())
        );
        let invalid = check_citation("Exodus 3:x", &library);
        assert!(matches!(invalid, CitationCheck::Invalid(_)));
        assert!(invalid.message().contains("Exodus 3:x"));
    }
}
