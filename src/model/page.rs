//! Output pages and their identifiers

use crate::model::element::{DualSide, ElementId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Placeholder text rendered on an omitted page
pub const OMITTED_PLACEHOLDER: &str = "OMITTED";

/// Page number as printed in the header
///
/// Inserted pages keep the number of the sequential page they follow and add
/// a letter suffix (`12A`, `12B`, ... `12Z`, `12AA`). Omitted pages occupy a
/// number without carrying content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageIdentifier {
    Sequential { number: u32 },
    Inserted { base: u32, suffix: String },
    Omitted { number: u32 },
}

impl PageIdentifier {
    pub fn sequential(number: u32) -> Self {
        PageIdentifier::Sequential { number }
    }

    pub fn inserted(base: u32, suffix: impl Into<String>) -> Self {
        PageIdentifier::Inserted {
            base,
            suffix: suffix.into(),
        }
    }

    pub fn omitted(number: u32) -> Self {
        PageIdentifier::Omitted { number }
    }

    /// Number (or base number for inserted pages)
    pub fn number(&self) -> u32 {
        match self {
            PageIdentifier::Sequential { number } | PageIdentifier::Omitted { number } => *number,
            PageIdentifier::Inserted { base, .. } => *base,
        }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, PageIdentifier::Omitted { .. })
    }

    /// Printed page label, e.g. `12`, `12A`
    pub fn label(&self) -> String {
        self.to_string()
    }

    fn rank(&self) -> u8 {
        match self {
            PageIdentifier::Sequential { .. } => 0,
            PageIdentifier::Omitted { .. } => 1,
            PageIdentifier::Inserted { .. } => 2,
        }
    }

    fn suffix(&self) -> &str {
        match self {
            PageIdentifier::Inserted { suffix, .. } => suffix,
            _ => "",
        }
    }
}

impl fmt::Display for PageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageIdentifier::Sequential { number } | PageIdentifier::Omitted { number } => {
                write!(f, "{}", number)
            }
            PageIdentifier::Inserted { base, suffix } => write!(f, "{}{}", base, suffix),
        }
    }
}

impl Ord for PageIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number()
            .cmp(&other.number())
            .then_with(|| self.rank().cmp(&other.rank()))
            .then_with(|| self.suffix().len().cmp(&other.suffix().len()))
            .then_with(|| self.suffix().cmp(other.suffix()))
    }
}

impl PartialOrd for PageIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order over page identifiers: number ascending, sequential before
/// inserted at the same base, suffixes `A < B < ... < Z < AA`.
pub fn compare_page_identifiers(a: &PageIdentifier, b: &PageIdentifier) -> Ordering {
    a.cmp(b)
}

/// Letter suffix for the `index`-th inserted page after one base (0 => `A`)
pub fn insert_suffix(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Half-open range of wrapped line indices within one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Character offsets into an element's `content`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

/// Placement of (a slice of) an element on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub element_id: ElementId,
    /// First page line occupied by the element's text
    pub start_line: u32,
    /// Page lines occupied by the text (wrapped lines times line spacing)
    pub line_count: u32,
    pub is_continuation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_prefix: Option<String>,
    /// Blank lines appended to line up a dual-dialogue column
    #[serde(default)]
    pub pad_lines: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<DualSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_range: Option<TextRange>,
}

impl PageElement {
    pub fn new(element_id: ElementId, start_line: u32, line_count: u32) -> Self {
        Self {
            element_id,
            start_line,
            line_count,
            is_continuation: false,
            line_range: None,
            continuation_prefix: None,
            pad_lines: 0,
            column: None,
            text_range: None,
        }
    }

    /// Page line just past the element, padding included
    pub fn end_line(&self) -> u32 {
        self.start_line + self.line_count + self.pad_lines
    }

    /// Synthetic "NAME (CONT'D)" cue heading a continued speech
    pub fn is_continuation_cue(&self) -> bool {
        self.continuation_prefix.is_some() && self.line_range.is_none()
    }
}

/// One output page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub identifier: PageIdentifier,
    pub elements: Vec<PageElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_continuation: Option<String>,
    pub lines_used: u32,
}

impl Page {
    /// Placeholder for a page number that was intentionally skipped
    pub fn omitted(number: u32) -> Self {
        Self {
            identifier: PageIdentifier::omitted(number),
            elements: Vec::new(),
            bottom_continuation: None,
            lines_used: 0,
        }
    }

    pub fn is_omitted(&self) -> bool {
        self.identifier.is_omitted()
    }

    /// Text to render instead of content, if any
    pub fn placeholder(&self) -> Option<&'static str> {
        self.is_omitted().then_some(OMITTED_PLACEHOLDER)
    }

    /// Elements placed in one dual column, in order
    pub fn column(&self, side: DualSide) -> impl Iterator<Item = &PageElement> {
        self.elements.iter().filter(move |e| e.column == Some(side))
    }
}
