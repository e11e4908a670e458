//! Structured text citations ("refs").
//!
//! A [`Reference`] locates a passage as a book plus a hierarchical section
//! path (e.g. chapter/verse), optionally ending a range at `to_sections`.
//! Parsing validates against a [`Library`] of known book schemas; the loose
//! parser accepts any book and is used for commentary source refs, where only
//! the section path matters for ordering.

mod library;
mod parse;

pub use library::{Addressing, BookSchema, Library, load_library};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use ts_rs::TS;

/// One level of a section path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum Section {
    Number(u32),
    /// Non-numeric level, e.g. a Talmud folio side like `2a`.
    Label(String),
}

impl Section {
    pub fn as_number(&self) -> Option<u32> {
        match self {
            Section::Number(n) => Some(*n),
            Section::Label(_) => None,
        }
    }

    /// Folio and side (`0` for a, `1` for b) for daf labels.
    pub fn daf(&self) -> Option<(u32, u8)> {
        let Section::Label(label) = self else {
            return None;
        };
        if !label.is_ascii() {
            return None;
        }
        let (digits, side) = label.split_at(label.len().checked_sub(1)?);
        let folio = digits.parse::<u32>().ok()?;
        match side {
            "a" | "A" => Some((folio, 0)),
            "b" | "B" => Some((folio, 1)),
            _ => None,
        }
    }

    /// Number for digit-only tokens, label otherwise.
    pub fn from_token(token: &str) -> Section {
        match token.parse::<u32>() {
            Ok(n) => Section::Number(n),
            Err(_) => Section::Label(token.to_string()),
        }
    }

    /// Same section with digit-only labels turned into numbers.
    pub fn normalized(self) -> Section {
        match self {
            Section::Label(label) => Section::from_token(&label),
            number => number,
        }
    }

    fn sort_key(&self) -> (u64, u8, &str) {
        match self {
            Section::Number(n) => (u64::from(*n), 0, ""),
            Section::Label(label) => match self.daf() {
                Some((folio, side)) => (u64::from(folio), 1 + side, ""),
                None => (u64::MAX, 3, label.as_str()),
            },
        }
    }
}

impl Ord for Section {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Section {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Number(n) => write!(f, "{n}"),
            Section::Label(label) => write!(f, "{label}"),
        }
    }
}

/// Reasons a citation cannot be turned into a [`Reference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    TooManyRanges(String),
    UnknownBook(String),
    InvalidSection { citation: String, token: String },
    TooDeep { book: String, depth: usize, max: usize },
    InvalidRange(String),
}

impl ParseError {
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::Empty => "empty",
            ParseError::TooManyRanges(_) => "too_many_ranges",
            ParseError::UnknownBook(_) => "unknown_book",
            ParseError::InvalidSection { .. } => "invalid_section",
            ParseError::TooDeep { .. } => "too_deep",
            ParseError::InvalidRange(_) => "invalid_range",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "No reference given."),
            ParseError::TooManyRanges(citation) => {
                write!(f, "Couldn't understand ref (too many -'s): {citation}")
            }
            ParseError::UnknownBook(book) => write!(f, "Unknown text: {book}"),
            ParseError::InvalidSection { citation, token } => {
                write!(f, "Couldn't understand text sections: {citation} ({token})")
            }
            ParseError::TooDeep { book, depth, max } => write!(
                f,
                "{book} has {max} levels of sections, but {depth} were given."
            ),
            ParseError::InvalidRange(citation) => {
                write!(f, "Couldn't understand the end of the range: {citation}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// An immutable, validated citation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    book: String,
    sections: Vec<Section>,
    to_sections: Vec<Section>,
    section_names: Vec<String>,
}

impl Reference {
    /// Build a reference, enforcing `sections.len() <= section_names.len()`
    /// and that a range end has the same depth as its start.
    pub fn new(
        book: impl Into<String>,
        sections: Vec<Section>,
        to_sections: Option<Vec<Section>>,
        section_names: Vec<String>,
    ) -> Result<Self, ParseError> {
        let book = book.into();
        if book.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        if sections.len() > section_names.len() {
            return Err(ParseError::TooDeep {
                depth: sections.len(),
                max: section_names.len(),
                book,
            });
        }
        let to_sections = to_sections.unwrap_or_else(|| sections.clone());
        if to_sections.len() != sections.len() {
            return Err(ParseError::InvalidRange(book));
        }
        Ok(Self {
            book,
            sections,
            to_sections,
            section_names,
        })
    }

    /// Parse against the library of known books.
    pub fn parse(citation: &str, library: &Library) -> Result<Self, ParseError> {
        parse::parse_with_library(citation, library)
    }

    /// Parse without a schema; section names are synthesized to the parsed depth.
    pub fn parse_loose(citation: &str) -> Result<Self, ParseError> {
        parse::parse_loose(citation)
    }

    pub fn book(&self) -> &str {
        &self.book
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn to_sections(&self) -> &[Section] {
        &self.to_sections
    }

    pub fn section_names(&self) -> &[String] {
        &self.section_names
    }

    pub fn is_range(&self) -> bool {
        self.sections != self.to_sections
    }

    /// A leaf reference names a single segment (or segment range).
    pub fn is_leaf(&self) -> bool {
        !self.section_names.is_empty() && self.sections.len() == self.section_names.len()
    }

    /// First and last segment numbers of a leaf reference on its own page of
    /// `page_len` segments. A range running into a later section ends at the
    /// end of the page.
    pub fn leaf_range(&self, page_len: u32) -> Option<(u32, u32)> {
        if !self.is_leaf() {
            return None;
        }
        let depth = self.sections.len() - 1;
        let first = self.sections.last()?.as_number()?;
        if self.sections[..depth] != self.to_sections[..depth] {
            return Some((first, page_len.max(first)));
        }
        let last = self.to_sections.last()?.as_number()?;
        Some((first.min(last), first.max(last)))
    }

    /// The containing section: a leaf reference with its last level dropped.
    pub fn section_ref(&self) -> Reference {
        let depth = self
            .sections
            .len()
            .min(self.section_names.len().saturating_sub(1));
        Reference {
            book: self.book.clone(),
            sections: self.sections[..depth].to_vec(),
            to_sections: self.sections[..depth].to_vec(),
            section_names: self.section_names.clone(),
        }
    }

    /// This reference narrowed to the segments `first..=last` of its page.
    pub fn with_leaf_range(&self, first: u32, last: u32) -> Option<Reference> {
        let page = self.section_ref();
        if page.sections.len() + 1 != self.section_names.len() {
            return None;
        }
        let mut sections = page.sections.clone();
        let mut to_sections = page.sections;
        sections.push(Section::Number(first.min(last)));
        to_sections.push(Section::Number(first.max(last)));
        Some(Reference {
            book: self.book.clone(),
            sections,
            to_sections,
            section_names: self.section_names.clone(),
        })
    }

    /// Lexicographic comparison over section paths; a strict prefix sorts first.
    pub fn compare(&self, other: &Reference) -> Ordering {
        compare_sections(&self.sections, &other.sections)
    }

    /// URL-safe form, e.g. `Mishnah_Berakhot.3.5-7`.
    pub fn url(&self) -> String {
        let mut out = self.book.replace(' ', "_");
        if !self.sections.is_empty() {
            out.push('.');
            out.push_str(&join_sections(&self.sections, "."));
        }
        if let Some(suffix) = self.range_suffix(".") {
            out.push('-');
            out.push_str(&suffix);
        }
        out
    }

    /// Heading text such as `Genesis Chapter 1` for the containing section.
    pub fn heading(&self) -> String {
        let levels: Vec<String> = self
            .section_names
            .iter()
            .zip(self.sections.iter())
            .take(self.section_names.len().saturating_sub(1))
            .map(|(name, section)| format!("{name} {section}"))
            .collect();
        if levels.is_empty() {
            self.book.clone()
        } else {
            format!("{} {}", self.book, levels.join(" : "))
        }
    }

    fn range_suffix(&self, separator: &str) -> Option<String> {
        let first_diff = self
            .sections
            .iter()
            .zip(self.to_sections.iter())
            .position(|(a, b)| a != b)?;
        Some(join_sections(&self.to_sections[first_diff..], separator))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.book)?;
        if !self.sections.is_empty() {
            write!(f, " {}", join_sections(&self.sections, ":"))?;
        }
        if let Some(suffix) = self.range_suffix(":") {
            write!(f, "-{suffix}")?;
        }
        Ok(())
    }
}

pub fn compare_sections(a: &[Section], b: &[Section]) -> Ordering {
    for (left, right) in a.iter().zip(b.iter()) {
        match left.cmp(right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

fn join_sections(sections: &[Section], separator: &str) -> String {
    sections
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
