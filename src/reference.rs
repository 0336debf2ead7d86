//! Canonical external references (Sefaria-style `Book.start-end` strings).

use crate::mode::CountingMode;
use crate::numerals::to_hebrew_numeral;
use crate::tree::ContentTree;
use crate::units::{PageLabel, Side, StudyUnit, UnitKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Namespace prefix for Mishnah book keys.
pub const MISHNAH_PREFIX: &str = "משנה_";

pub const REFERENCE_BASE_URL: &str = "https://www.sefaria.org/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Scripture,
    Mishnah,
    Talmud,
}

impl Category {
    /// Category from the first component of a book path.
    pub fn from_root(root: &str) -> Option<Self> {
        let normalized: String = root
            .chars()
            .filter(|c| !matches!(c, '"' | '\'' | '״' | '׳'))
            .collect();
        let normalized = normalized.trim();
        if normalized == "תנך" || normalized.eq_ignore_ascii_case("tanakh") {
            Some(Category::Scripture)
        } else if normalized.starts_with("משנה") || normalized.eq_ignore_ascii_case("mishnah") {
            Some(Category::Mishnah)
        } else if normalized.starts_with("תלמוד") || normalized.to_ascii_lowercase().starts_with("talmud") {
            Some(Category::Talmud)
        } else {
            None
        }
    }
}

/// Tractate display name to canonical key, e.g. "ברכות" to "Berakhot".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TractateMap {
    names: HashMap<String, String>,
}

impl TractateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, display: impl Into<String>, key: impl Into<String>) {
        self.names.insert(display.into(), key.into());
    }

    pub fn get(&self, display: &str) -> Option<&str> {
        self.names.get(display.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Display names, sorted.
    pub fn display_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TractateMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(display, key)| (display.into(), key.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalRef {
    Single(String),
    /// Cross-book span: first book to its end, second book from its start.
    Split(String, String),
}

impl CanonicalRef {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            CanonicalRef::Single(reference) => vec![reference],
            CanonicalRef::Split(first, second) => vec![first, second],
        }
    }
}

/// Link for a reference string.
pub fn reference_url(reference: &str) -> String {
    format!("{REFERENCE_BASE_URL}{}", reference.replace(' ', "_"))
}

/// Where a unit sits: its book path and, for mishnayot, its chapter.
struct Located<'u> {
    book: &'u [String],
    chapter: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub struct ReferenceBuilder<'a> {
    tree: &'a ContentTree,
    tractates: &'a TractateMap,
}

impl<'a> ReferenceBuilder<'a> {
    pub fn new(tree: &'a ContentTree, tractates: &'a TractateMap) -> Self {
        Self { tree, tractates }
    }

    /// Reference for the span `first..=last`, or `None` when a required
    /// piece (category, book key, chapter) cannot be determined.
    pub fn build(
        &self,
        first: &StudyUnit,
        last: &StudyUnit,
        mode: CountingMode,
    ) -> Option<CanonicalRef> {
        let start = self.locate(first, mode);
        let end = self.locate(last, mode);
        let start_key = self.book_key(start.book)?;

        if start.book == end.book {
            let span = self.span(&start_key, (first, &start), (last, &end), mode)?;
            return Some(CanonicalRef::Single(span));
        }

        let end_key = self.book_key(end.book)?;
        let first_book_end = self.tree.book_end(start.book, mode)?;
        let second_book_start = self.tree.book_start(end.book, mode)?;

        let first_ref = self.span(
            &start_key,
            (first, &start),
            (&first_book_end, &self.locate(&first_book_end, mode)),
            mode,
        )?;
        let second_ref = self.span(
            &end_key,
            (&second_book_start, &self.locate(&second_book_start, mode)),
            (last, &end),
            mode,
        )?;
        Some(CanonicalRef::Split(first_ref, second_ref))
    }

    /// `key.from-to`, collapsed to `key.point` when the span is one unit.
    ///
    /// A single whole daf is addressed by its leaf number alone.
    fn span(
        &self,
        key: &str,
        (first, start): (&StudyUnit, &Located),
        (last, end): (&StudyUnit, &Located),
        mode: CountingMode,
    ) -> Option<String> {
        let from = self.start_address(first, start, mode)?;
        let to = self.end_address(last, end, mode)?;
        let whole_daf = PageLabel::new(last.ordinal, Side::B).to_string();
        if mode == CountingMode::Pages && first == last && to == whole_daf {
            return Some(format!("{key}.{}", last.ordinal));
        }
        Some(format_range(key, &from, &to))
    }

    fn locate<'u>(&self, unit: &'u StudyUnit, mode: CountingMode) -> Located<'u> {
        if mode == CountingMode::Units {
            if let Some((chapter_name, book)) = unit.book_path.split_last() {
                if let Some(number) = self.tree.schema().chapter_number(chapter_name) {
                    return Located {
                        book,
                        chapter: Some(number),
                    };
                }
            }
        }
        Located {
            book: &unit.book_path,
            chapter: None,
        }
    }

    fn book_key(&self, book: &[String]) -> Option<String> {
        let category = Category::from_root(book.first()?)?;
        let name = book.last()?;
        match category {
            Category::Scripture => Some(name.clone()),
            Category::Mishnah => Some(format!("{MISHNAH_PREFIX}{name}")),
            Category::Talmud => self.tractates.get(name).map(str::to_string),
        }
    }

    fn start_address(&self, unit: &StudyUnit, located: &Located, mode: CountingMode) -> Option<String> {
        match mode {
            CountingMode::Chapters | CountingMode::Units => unit_address(unit, located),
            CountingMode::Pages | CountingMode::Leaves => unit.page_label().map(|p| p.to_string()),
        }
    }

    /// End address; a whole daf ends on side b unless the book ends on its side a.
    fn end_address(&self, unit: &StudyUnit, located: &Located, mode: CountingMode) -> Option<String> {
        match (mode, unit.kind) {
            (CountingMode::Pages, UnitKind::Daf) => {
                let full = PageLabel::new(unit.ordinal, Side::B);
                let book_last = self
                    .tree
                    .book_end(located.book, CountingMode::Leaves)
                    .and_then(|u| u.page_label());
                Some(match book_last {
                    Some(label) if label.leaf == unit.ordinal => label,
                    _ => full,
                }
                .to_string())
            }
            _ => self.start_address(unit, located, mode),
        }
    }
}

fn unit_address(unit: &StudyUnit, located: &Located) -> Option<String> {
    match unit.kind {
        UnitKind::Chapter => to_hebrew_numeral(unit.ordinal, false).ok(),
        UnitKind::Mishnah => {
            let chapter = to_hebrew_numeral(located.chapter?, false).ok()?;
            Some(format!("{chapter}.{}", unit.ordinal))
        }
        UnitKind::Daf | UnitKind::Amud => None,
    }
}

fn format_range(key: &str, from: &str, to: &str) -> String {
    if from == to {
        format!("{key}.{from}")
    } else {
        format!("{key}.{from}-{to}")
    }
}
