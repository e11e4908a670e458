use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// How the top level of a book is numbered.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Addressing {
    #[default]
    Numeric,
    /// Folio sides (`2a`, `2b`, ...) at the top level.
    Daf,
}

/// Shape of one known text.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BookSchema {
    pub title: String,
    #[serde(default)]
    pub he_title: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub section_names: Vec<String>,
    #[serde(default)]
    pub addressing: Addressing,
    #[serde(default)]
    pub category: Option<String>,
}

impl BookSchema {
    fn numeric(title: &str, category: &str, section_names: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            he_title: None,
            aliases: Vec::new(),
            section_names: section_names.iter().map(|s| s.to_string()).collect(),
            addressing: Addressing::Numeric,
            category: Some(category.to_string()),
        }
    }

    fn matches(&self, key: &str) -> bool {
        lookup_key(&self.title) == key || self.aliases.iter().any(|alias| lookup_key(alias) == key)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct LibraryFile {
    #[serde(default)]
    books: Vec<BookSchema>,
}

/// Catalog of book schemas used to validate citations.
#[derive(Debug, Clone, Default)]
pub struct Library {
    books: Vec<BookSchema>,
}

impl Library {
    pub fn new(books: Vec<BookSchema>) -> Self {
        let mut library = Self::default();
        for book in books {
            library.insert(book);
        }
        library
    }

    /// Small built-in catalog used when no library file is configured.
    pub fn builtin() -> Self {
        let mut books: Vec<BookSchema> = ["Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy"]
            .iter()
            .map(|title| BookSchema::numeric(title, "Tanach", &["Chapter", "Verse"]))
            .collect();
        books.push(BookSchema::numeric("Psalms", "Tanach", &["Chapter", "Verse"]));
        books.push(BookSchema::numeric("Job", "Tanach", &["Chapter", "Verse"]));
        books.push(BookSchema::numeric(
            "Mishnah Berakhot",
            "Mishna",
            &["Chapter", "Mishna"],
        ));
        books.push(BookSchema::numeric(
            "Rashi on Genesis",
            "Commentary",
            &["Chapter", "Verse", "Comment"],
        ));
        books.push(BookSchema::numeric(
            "Genesis Rabbah",
            "Midrash",
            &["Chapter", "Paragraph"],
        ));
        for title in ["Berakhot", "Shabbat"] {
            books.push(BookSchema {
                title: title.to_string(),
                he_title: None,
                aliases: Vec::new(),
                section_names: vec!["Daf".to_string(), "Line".to_string()],
                addressing: Addressing::Daf,
                category: Some("Talmud".to_string()),
            });
        }
        Self::new(books)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: LibraryFile = toml::from_str(contents).context("library is not valid TOML")?;
        Ok(Self::new(file.books))
    }

    /// Case-insensitive lookup over titles and aliases; `_` counts as a space.
    pub fn find(&self, name: &str) -> Option<&BookSchema> {
        let key = lookup_key(name);
        self.books.iter().find(|book| book.matches(&key))
    }

    /// Add a schema, replacing any existing one with the same title.
    pub fn insert(&mut self, schema: BookSchema) {
        let key = lookup_key(&schema.title);
        match self.books.iter_mut().find(|book| lookup_key(&book.title) == key) {
            Some(existing) => *existing = schema,
            None => self.books.push(schema),
        }
    }

    pub fn books(&self) -> &[BookSchema] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

/// Load the book library, falling back to the built-in catalog.
pub fn load_library(path: &Path) -> Library {
    let contents = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => {
            warn!(path = %path.display(), "Using built-in library: {err}");
            return Library::builtin();
        }
    };
    match Library::from_toml(&contents) {
        Ok(library) if !library.is_empty() => {
            info!(path = %path.display(), books = library.len(), "Loaded book library");
            library
        }
        Ok(_) => {
            debug!(path = %path.display(), "Library file lists no books; using built-in");
            Library::builtin()
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid library TOML: {err:#}");
            Library::builtin()
        }
    }
}

fn lookup_key(name: &str) -> String {
    name.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_underscores() {
        let library = Library::builtin();
        assert_eq!(
            library.find("mishnah_berakhot").map(|b| b.title.as_str()),
            Some("Mishnah Berakhot")
        );
        assert!(library.find("Unknown Book").is_none());
    }

    #[test]
    fn toml_library_with_aliases() {
        let library = Library::from_toml(
            r#"
            [[books]]
            title = "Genesis"
            aliases = ["Bereshit", "Gen"]
            section_names = ["Chapter", "Verse"]

            [[books]]
            title = "Yoma"
            section_names = ["Daf", "Line"]
            addressing = "daf"
            "#,
        )
        .expect("library should parse");
        assert_eq!(library.len(), 2);
        assert_eq!(library.find("gen").map(|b| b.title.as_str()), Some("Genesis"));
        assert_eq!(library.find("Yoma").map(|b| b.addressing), Some(Addressing::Daf));
    }

    #[test]
    fn insert_replaces_same_title() {
        let mut library = Library::builtin();
        let before = library.len();
        library.insert(BookSchema::numeric("Genesis", "Torah", &["Perek", "Pasuk"]));
        assert_eq!(library.len(), before);
        assert_eq!(
            library.find("Genesis").map(|b| b.section_names[0].as_str()),
            Some("Perek")
        );
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let library = load_library(Path::new("/nonexistent/library.toml"));
        assert!(library.find("Genesis").is_some());
    }
}
