//! Text helpers for commentary display and citation input.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const NO_TEXT: &str = "[no text available]";

static RE_HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Limits for the collapsed form of commentary text.
#[derive(Debug, Clone, Copy)]
pub struct ShortTextLimits {
    /// Texts longer than this many characters get cut.
    pub max_chars: usize,
    /// Number of characters kept before the ellipsis.
    pub cut_at: usize,
}

impl Default for ShortTextLimits {
    fn default() -> Self {
        Self {
            max_chars: 180,
            cut_at: 150,
        }
    }
}

/// True when the text is mostly Hebrew script.
pub fn is_hebrew(text: &str) -> bool {
    let mut hebrew = 0usize;
    let mut latin = 0usize;
    for ch in text.chars() {
        if ('\u{0590}'..='\u{05FF}').contains(&ch) {
            hebrew += 1;
        } else if ch.is_ascii_alphabetic() {
            latin += 1;
        }
    }
    hebrew > latin
}

pub fn strip_html(text: &str) -> String {
    RE_HTML_TAG.replace_all(text, "").into_owned()
}

/// Collapsed commentary text: falls back to `backup`, strips markup and cuts
/// long passages.
pub fn short_commentary_text(text: &str, backup: &str, limits: ShortTextLimits) -> String {
    let source = long_commentary_text(text, backup);
    let plain = strip_html(&source);
    if plain.chars().count() > limits.max_chars {
        let mut short: String = plain.chars().take(limits.cut_at).collect();
        short.push_str("...");
        short
    } else {
        plain
    }
}

/// Full commentary text with the same fallback chain as the short form.
pub fn long_commentary_text(text: &str, backup: &str) -> String {
    if !text.is_empty() {
        text.to_string()
    } else if !backup.is_empty() {
        backup.to_string()
    } else {
        NO_TEXT.to_string()
    }
}

/// Canonical form of a typed citation: NFC, trimmed, inner whitespace collapsed.
pub fn normalize_input(input: &str) -> String {
    let composed: String = input.nfc().collect();
    RE_WHITESPACE
        .replace_all(composed.trim(), " ")
        .into_owned()
}

/// Capitalize the first letter of every word ("quoting commentary" -> "Quoting Commentary").
pub fn proper_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
