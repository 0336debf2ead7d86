use crate::mode::CountingMode;
use crate::numerals::{hebrew_numeral_or_decimal, letter_value};
use crate::tree::{ContentNode, ContentTree, display_path, parse_path};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Default first leaf of a tractate (daf ב).
pub const DEFAULT_FIRST_PAGE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn letter(&self) -> char {
        match self {
            Side::A => 'a',
            Side::B => 'b',
        }
    }

    pub fn hebrew_letter(&self) -> char {
        match self {
            Side::A => 'א',
            Side::B => 'ב',
        }
    }
}

/// A leaf number with a side, written like `64a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageLabel {
    pub leaf: u32,
    pub side: Side,
}

impl PageLabel {
    pub fn new(leaf: u32, side: Side) -> Self {
        Self { leaf, side }
    }

    /// Parse `64a`, `64b`, `64 א`, or Hebrew letters such as `סד ב`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let last = text.chars().last()?;
        let side = match last {
            'a' | 'A' | 'א' | '.' => Side::A,
            'b' | 'B' | 'ב' | ':' => Side::B,
            _ => return None,
        };
        let number = text[..text.len() - last.len_utf8()].trim();
        if number.is_empty() {
            return None;
        }
        let leaf = match number.parse::<u32>() {
            Ok(leaf) => leaf,
            Err(_) if number.chars().all(|c| letter_value(c) > 0 || "׳״'\"".contains(c)) => {
                crate::numerals::from_hebrew_numeral(number)
            }
            Err(_) => return None,
        };
        (leaf > 0).then_some(Self { leaf, side })
    }

    /// Position counting single sides, where 1a is 1 and 1b is 2.
    pub fn side_index(&self) -> u32 {
        match self.side {
            Side::A => self.leaf.saturating_mul(2).saturating_sub(1),
            Side::B => self.leaf.saturating_mul(2),
        }
    }

    pub fn from_side_index(index: u32) -> Self {
        let leaf = index.div_ceil(2);
        let side = if index % 2 == 1 { Side::A } else { Side::B };
        Self { leaf, side }
    }
}

impl fmt::Display for PageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.leaf, self.side.letter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Chapter,
    Mishnah,
    Daf,
    Amud,
}

impl UnitKind {
    pub fn noun(&self) -> &'static str {
        match self {
            UnitKind::Chapter => "פרק",
            UnitKind::Mishnah => "משנה",
            UnitKind::Daf => "דף",
            UnitKind::Amud => "עמוד",
        }
    }
}

/// One atomic, orderable item of study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyUnit {
    pub book_path: Vec<String>,
    pub unit_label: String,
    pub ordinal: u32,
    pub kind: UnitKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
}

impl StudyUnit {
    fn new(book_path: &[String], kind: UnitKind, ordinal: u32) -> Self {
        Self {
            book_path: book_path.to_vec(),
            unit_label: format!(
                "{} {}",
                kind.noun(),
                hebrew_numeral_or_decimal(ordinal, false)
            ),
            ordinal,
            kind,
            side: None,
        }
    }

    fn amud(book_path: &[String], page: PageLabel) -> Self {
        Self {
            book_path: book_path.to_vec(),
            unit_label: format!(
                "{} {}{}",
                UnitKind::Amud.noun(),
                hebrew_numeral_or_decimal(page.leaf, false),
                page.side.hebrew_letter()
            ),
            ordinal: page.leaf,
            kind: UnitKind::Amud,
            side: Some(page.side),
        }
    }

    pub fn book_display_name(&self) -> String {
        display_path(&self.book_path)
    }

    /// Leaf and side for page-based units. A whole daf reports side a.
    pub fn page_label(&self) -> Option<PageLabel> {
        match self.kind {
            UnitKind::Daf => Some(PageLabel::new(self.ordinal, Side::A)),
            UnitKind::Amud => Some(PageLabel::new(self.ordinal, self.side.unwrap_or(Side::A))),
            UnitKind::Chapter | UnitKind::Mishnah => None,
        }
    }
}

/// Expand the selected paths into study units, in selection order.
///
/// Paths that do not resolve are skipped.
pub fn expand_to_units<S: AsRef<str>>(
    tree: &ContentTree,
    selected: &[S],
    mode: CountingMode,
) -> Vec<StudyUnit> {
    let mut units = Vec::new();
    for path in selected {
        let mut parts = parse_path(path.as_ref());
        match tree.node_at(&parts) {
            Some(node) => collect_units(node, &mut parts, mode, &mut units),
            None => warn!(path = path.as_ref(), "selection path not found in content tree"),
        }
    }
    debug!(mode = %mode, count = units.len(), "collected study units");
    units
}

fn collect_units(
    node: &ContentNode,
    path: &mut Vec<String>,
    mode: CountingMode,
    out: &mut Vec<StudyUnit>,
) {
    let attributes = node.attributes();
    match mode {
        CountingMode::Chapters => {
            let chapters = node.chapter_children();
            if chapters.is_empty() {
                let count = attributes.chapter_count.unwrap_or(0);
                let book = path.as_slice();
                out.extend((1..=count).map(|n| StudyUnit::new(book, UnitKind::Chapter, n)));
            } else {
                for chapter in chapters {
                    out.push(StudyUnit {
                        book_path: path.clone(),
                        unit_label: chapter.name().to_string(),
                        ordinal: chapter.chapter_number().unwrap_or(0),
                        kind: UnitKind::Chapter,
                        side: None,
                    });
                }
            }
        }
        CountingMode::Units => {
            let count = attributes.unit_count.unwrap_or(0);
            let book = path.as_slice();
            out.extend((1..=count).map(|n| StudyUnit::new(book, UnitKind::Mishnah, n)));
            for chapter in node.chapter_children() {
                let count = chapter.attributes().unit_count.unwrap_or(0);
                path.push(chapter.name().to_string());
                let book = path.as_slice();
                out.extend((1..=count).map(|n| StudyUnit::new(book, UnitKind::Mishnah, n)));
                path.pop();
            }
        }
        CountingMode::Pages => {
            if let Some(length) = attributes.page_length {
                let first = attributes.first_page.unwrap_or(DEFAULT_FIRST_PAGE);
                let leaves = length.ceil() as u32;
                let book = path.as_slice();
                out.extend(
                    (first..first.saturating_add(leaves))
                        .map(|leaf| StudyUnit::new(book, UnitKind::Daf, leaf)),
                );
            }
        }
        CountingMode::Leaves => {
            if let Some(length) = attributes.page_length {
                let first = attributes.first_page.unwrap_or(DEFAULT_FIRST_PAGE);
                let start = PageLabel::new(first, Side::A).side_index();
                let sides = (length * 2.0).round() as u32;
                let book = path.as_slice();
                out.extend(
                    (start..start.saturating_add(sides))
                        .map(|index| StudyUnit::amud(book, PageLabel::from_side_index(index))),
                );
            }
        }
    }

    for child in node.sections() {
        path.push(child.name().to_string());
        collect_units(child, path, mode, out);
        path.pop();
    }
}

impl ContentTree {
    /// First addressable unit of the book at `parts`.
    pub fn book_start<S: AsRef<str>>(&self, parts: &[S], mode: CountingMode) -> Option<StudyUnit> {
        self.book_units(parts, mode).into_iter().next()
    }

    /// Last addressable chapter, mishnah, daf or side of the book at `parts`.
    ///
    /// A recorded last-page label overrides the computed end in leaves mode.
    pub fn book_end<S: AsRef<str>>(&self, parts: &[S], mode: CountingMode) -> Option<StudyUnit> {
        let last = self.book_units(parts, mode).pop()?;
        if mode == CountingMode::Leaves {
            let node = self.node_at(parts)?;
            if let Some(label) = node.attributes().last_page {
                return Some(StudyUnit::amud(&last.book_path, label));
            }
        }
        Some(last)
    }

    fn book_units<S: AsRef<str>>(&self, parts: &[S], mode: CountingMode) -> Vec<StudyUnit> {
        let mut path: Vec<String> = parts.iter().map(|p| p.as_ref().to_string()).collect();
        let mut units = Vec::new();
        if let Some(node) = self.node_at(&path) {
            collect_units(node, &mut path, mode, &mut units);
        }
        units
    }
}
