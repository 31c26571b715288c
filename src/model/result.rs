//! Pagination output: pages, position index, warnings and statistics

use crate::model::element::ElementId;
use crate::model::page::{LineRange, Page};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category of a non-fatal pagination warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A configuration value was out of range and has been replaced
    InvalidConfig,
    /// An element needs more lines than a whole page
    ElementExceedsPage,
    /// An orphan rule could not be satisfied even by moving the element
    UnpreventableOrphan,
    /// A dual-dialogue column is taller than a page
    DualDialogueOverflow,
    /// A single word is wider than its element's line
    LineOverflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationWarning {
    pub kind: WarningKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_index: Option<usize>,
    pub message: String,
}

impl PaginationWarning {
    pub fn config(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::InvalidConfig,
            element_id: None,
            page_index: None,
            message: message.into(),
        }
    }

    pub fn element(
        kind: WarningKind,
        element_id: ElementId,
        page_index: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            element_id: Some(element_id),
            page_index: Some(page_index),
            message: message.into(),
        }
    }
}

/// Where an element ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPosition {
    /// Indices into `PaginationResult::pages`, ascending
    pub pages: Vec<usize>,
    /// Page line of the first text line, on the first page
    pub start_line: u32,
    /// Page line just past the last text line, on the last page
    pub end_line: u32,
    pub is_split: bool,
    /// Wrapped line slices per page, in page order
    pub line_ranges: Vec<LineRange>,
    pub total_lines: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationStats {
    pub page_count: usize,
    pub element_count: usize,
    /// Number of page boundaries in the laid out document
    pub page_break_count: usize,
    /// Elements rendered across more than one page
    pub split_count: usize,
    /// MORE/CONT'D pairs inserted
    pub continuation_count: usize,
    /// Wall-clock time of the run; stamped at the message boundary
    pub duration_micros: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub pages: Vec<Page>,
    pub element_positions: BTreeMap<ElementId, ElementPosition>,
    pub warnings: Vec<PaginationWarning>,
    pub stats: PaginationStats,
}

impl PaginationResult {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn position(&self, id: &str) -> Option<&ElementPosition> {
        self.element_positions.get(&ElementId::new(id))
    }

    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &PaginationWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub fn has_warning(&self, kind: WarningKind, id: &str) -> bool {
        self.warnings_of(kind)
            .any(|w| w.element_id.as_ref().map(|e| e.as_str()) == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_wire_format() {
        let warning = PaginationWarning::element(
            WarningKind::UnpreventableOrphan,
            ElementId::new("h3"),
            4,
            "scene_heading cannot be kept with what follows",
        );
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"kind\":\"unpreventable_orphan\""));
        assert!(json.contains("\"elementId\":\"h3\""));
        assert!(json.contains("\"pageIndex\":4"));

        let json = serde_json::to_string(&PaginationWarning::config("bad")).unwrap();
        assert_eq!(json, r#"{"kind":"invalid_config","message":"bad"}"#);
    }

    #[test]
    fn test_stats_field_names() {
        let json = serde_json::to_value(PaginationStats::default()).unwrap();
        for key in [
            "pageCount",
            "elementCount",
            "pageBreakCount",
            "splitCount",
            "continuationCount",
            "durationMicros",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
