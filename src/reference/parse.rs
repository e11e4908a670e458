use super::{Addressing, BookSchema, Library, ParseError, Reference, Section};
use crate::text_utils::normalize_input;
use once_cell::sync::Lazy;
use regex::Regex;

// "Genesis 4" or "Berakhot 2a": a trailing space-separated first section.
static RE_BOOK_AND_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<book>.+?) (?P<first>\d+[abAB]?)$").unwrap());

struct RawCitation {
    text: String,
    book: String,
    start: Vec<String>,
    end: Option<Vec<String>>,
}

fn split_citation(citation: &str) -> Result<RawCitation, ParseError> {
    let text = normalize_input(citation);
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    let parts: Vec<&str> = text.split('-').collect();
    if parts.len() > 2 {
        return Err(ParseError::TooManyRanges(text));
    }

    let base = parts[0].trim().replace(':', ".");
    let mut tokens: Vec<String> = base.split('.').map(|t| t.trim().to_string()).collect();
    let mut book = tokens.remove(0).replace('_', " ");
    if let Some(caps) = RE_BOOK_AND_FIRST.captures(&book) {
        let first = caps["first"].to_string();
        let head = caps["book"].trim().to_string();
        tokens.insert(0, first);
        book = head;
    }
    let book = book.trim().to_string();
    if book.is_empty() {
        return Err(ParseError::Empty);
    }
    if let Some(token) = tokens.iter().find(|t| t.is_empty()) {
        return Err(ParseError::InvalidSection {
            citation: text.clone(),
            token: token.clone(),
        });
    }

    let end = match parts.get(1) {
        Some(end) => {
            let end_tokens: Vec<String> = end
                .trim()
                .replace(':', ".")
                .split('.')
                .map(|t| t.trim().to_string())
                .collect();
            if end_tokens.iter().any(String::is_empty) {
                return Err(ParseError::InvalidRange(text));
            }
            Some(end_tokens)
        }
        None => None,
    };

    Ok(RawCitation {
        text,
        book,
        start: tokens,
        end,
    })
}

fn parse_section(
    token: &str,
    level: usize,
    schema: &BookSchema,
    citation: &str,
) -> Result<Section, ParseError> {
    let invalid = || ParseError::InvalidSection {
        citation: citation.to_string(),
        token: token.to_string(),
    };
    if level == 0 && schema.addressing == Addressing::Daf {
        let section = Section::Label(token.to_ascii_lowercase());
        return section.daf().map(|_| section.clone()).ok_or_else(invalid);
    }
    token.parse::<u32>().map(Section::Number).map_err(|_| invalid())
}

/// A range end replaces the trailing levels of the start, so
/// `Genesis 1:3-5` ends at 1:5 and `Job 2:3-3:1` ends at 3:1.
fn apply_range_end<F>(
    sections: &[Section],
    end: Option<Vec<String>>,
    citation: &str,
    mut parse: F,
) -> Result<Option<Vec<Section>>, ParseError>
where
    F: FnMut(&str, usize) -> Result<Section, ParseError>,
{
    let Some(end) = end else {
        return Ok(None);
    };
    if sections.is_empty() || end.len() > sections.len() {
        return Err(ParseError::InvalidRange(citation.to_string()));
    }
    let delta = sections.len() - end.len();
    let mut to_sections = sections.to_vec();
    for (offset, token) in end.iter().enumerate() {
        to_sections[delta + offset] = parse(token, delta + offset)
            .map_err(|_| ParseError::InvalidRange(citation.to_string()))?;
    }
    Ok(Some(to_sections))
}

pub(super) fn parse_with_library(citation: &str, library: &Library) -> Result<Reference, ParseError> {
    let raw = split_citation(citation)?;
    let schema = library
        .find(&raw.book)
        .ok_or_else(|| ParseError::UnknownBook(raw.book.clone()))?;
    if raw.start.len() > schema.section_names.len() {
        return Err(ParseError::TooDeep {
            book: schema.title.clone(),
            depth: raw.start.len(),
            max: schema.section_names.len(),
        });
    }

    let sections = raw
        .start
        .iter()
        .enumerate()
        .map(|(level, token)| parse_section(token, level, schema, &raw.text))
        .collect::<Result<Vec<_>, _>>()?;
    let to_sections = apply_range_end(&sections, raw.end, &raw.text, |token, level| {
        parse_section(token, level, schema, &raw.text)
    })?;

    Reference::new(
        schema.title.clone(),
        sections,
        to_sections,
        schema.section_names.clone(),
    )
}

pub(super) fn parse_loose(citation: &str) -> Result<Reference, ParseError> {
    let raw = split_citation(citation)?;
    let sections: Vec<Section> = raw.start.iter().map(|t| Section::from_token(t)).collect();
    let to_sections = apply_range_end(&sections, raw.end, &raw.text, |token, _| {
        Ok(Section::from_token(token))
    })?;
    let section_names = (1..=sections.len()).map(|level| format!("Level {level}")).collect();
    Reference::new(raw.book, sections, to_sections, section_names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Library {
        Library::builtin()
    }

    #[test]
    fn space_and_colon_form() {
        let r = Reference::parse("Genesis 1:3", &library()).unwrap();
        assert_eq!(r.book(), "Genesis");
        assert_eq!(r.sections(), &[Section::Number(1), Section::Number(3)]);
        assert!(r.is_leaf());
        assert!(!r.is_range());
    }

    #[test]
    fn url_form_round_trips_to_display() {
        let r = Reference::parse("Mishnah_Berakhot.3.5", &library()).unwrap();
        assert_eq!(r.to_string(), "Mishnah Berakhot 3:5");
        assert_eq!(r.url(), "Mishnah_Berakhot.3.5");
    }

    #[test]
    fn short_range_end_replaces_last_level() {
        let r = Reference::parse("Genesis 1:3-5", &library()).unwrap();
        assert_eq!(r.to_sections(), &[Section::Number(1), Section::Number(5)]);
        assert_eq!(r.leaf_range(31), Some((3, 5)));
    }

    #[test]
    fn cross_chapter_range() {
        let r = Reference::parse("Job 2:3-3:1", &library()).unwrap();
        assert_eq!(r.to_sections(), &[Section::Number(3), Section::Number(1)]);
        assert_eq!(r.leaf_range(13), Some((3, 13)));
    }

    #[test]
    fn book_lookup_uses_aliases_and_case() {
        let r = Reference::parse("genesis 4", &library()).unwrap();
        assert_eq!(r.book(), "Genesis");
        assert!(!r.is_leaf());
    }

    #[test]
    fn daf_addressing() {
        let r = Reference::parse("Berakhot 2a:5", &library()).unwrap();
        assert_eq!(r.sections()[0], Section::Label("2a".to_string()));
        assert_eq!(r.to_string(), "Berakhot 2a:5");
        let err = Reference::parse("Berakhot 2:5", &library()).unwrap_err();
        assert_eq!(err.code(), "invalid_section");
    }

    #[test]
    fn malformed_citations_fail() {
        let lib = library();
        assert_eq!(Reference::parse("", &lib).unwrap_err(), ParseError::Empty);
        assert_eq!(
            Reference::parse("Genesis 1-2-3", &lib).unwrap_err().code(),
            "too_many_ranges"
        );
        assert_eq!(
            Reference::parse("Nowhere 1:1", &lib).unwrap_err(),
            ParseError::UnknownBook("Nowhere".to_string())
        );
        assert_eq!(
            Reference::parse("Genesis 1:x", &lib).unwrap_err().code(),
            "invalid_section"
        );
        assert_eq!(
            Reference::parse("Genesis 1:2:3", &lib).unwrap_err().code(),
            "too_deep"
        );
        assert_eq!(
            Reference::parse("Genesis-3", &lib).unwrap_err().code(),
            "invalid_range"
        );
        assert_eq!(
            Reference::parse("Genesis 1:1-1:2:3", &lib).unwrap_err().code(),
            "invalid_range"
        );
    }

    #[test]
    fn loose_parse_accepts_any_book() {
        let r = Reference::parse_loose("Rashi on Exodus 12:2:1").unwrap();
        assert_eq!(r.book(), "Rashi on Exodus");
        assert_eq!(r.sections().len(), 3);
        assert_eq!(r.section_names().len(), 3);

        let daf = Reference::parse_loose("Yoma 3b:4").unwrap();
        assert_eq!(daf.sections()[0], Section::Label("3b".to_string()));

        let book_only = Reference::parse_loose("Sefer HaChinukh").unwrap();
        assert!(book_only.sections().is_empty());
    }
}
