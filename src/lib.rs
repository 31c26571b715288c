//! Script-Pager: a deterministic screenplay pagination engine
//!
//! This crate lays out an ordered stream of screenplay elements on pages:
//! - Greedy word wrapping in a fixed-pitch grid
//! - Keep-together, orphan and widow rules with MORE/CONT'D markers
//! - Side-by-side dual dialogue
//! - Locked page numbering with inserted and omitted pages
//!
//! [`paginate`] is a pure function. The [`protocol`] module wraps it in the
//! JSON message contract used by browser workers and native hosts.

pub mod error;
pub mod layout;
pub mod model;
pub mod protocol;
pub mod wasm;

pub use error::{EngineError, Result};
pub use model::{
    compare_page_identifiers, DualSide, Element, ElementId, ElementPosition, ElementStyle,
    ElementType, LineRange, OrphanControl, Page, PageConfig, PageElement, PageIdentifier,
    PaginationResult, PaginationStats, PaginationWarning, Preset, WarningKind,
};
pub use protocol::{Engine, Request, RequestId, Response};

use layout::{aggregate, BreakEngine, LineWrapper, Measured};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Lay out `elements` on pages.
///
/// Fails only on malformed input (empty or duplicate element IDs). Layout
/// problems are reported as warnings inside the result. The returned
/// `stats.duration_micros` is left at 0; callers that time the run fill it in.
pub fn paginate(elements: &[Element], config: &PageConfig) -> Result<PaginationResult> {
    check_ids(elements)?;

    let mut warnings = Vec::new();
    let effective = config.resolve(&mut warnings);
    let wrapper = LineWrapper::new();
    let items: Vec<Measured> = elements
        .iter()
        .map(|element| Measured::measure(element, &effective, &wrapper))
        .collect();

    let outcome = BreakEngine::new(&effective, &items).run();
    let result = aggregate(&items, &effective, outcome, warnings);

    debug!(
        elements = result.stats.element_count,
        pages = result.stats.page_count,
        splits = result.stats.split_count,
        warnings = result.warnings.len(),
        "paginated"
    );
    Ok(result)
}

fn check_ids(elements: &[Element]) -> Result<()> {
    let mut seen = FxHashSet::default();
    seen.reserve(elements.len());
    for (index, element) in elements.iter().enumerate() {
        if element.id.as_str().is_empty() {
            return Err(EngineError::invalid_input(format!(
                "element {} has an empty id",
                index
            )));
        }
        if !seen.insert(element.id.as_str()) {
            return Err(EngineError::invalid_input(format!(
                "duplicate element id \"{}\"",
                element.id
            )));
        }
    }
    Ok(())
}

/// The Feature Film preset
pub fn default_config() -> PageConfig {
    PageConfig::feature_film()
}

/// Crate version reported to hosts
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(lines: usize) -> String {
        vec!["line"; lines].join("\n")
    }

    #[test]
    fn test_paginate_simple_scene() {
        let elements = vec![
            Element::new("h1", ElementType::SceneHeading, "INT. DINER - NIGHT"),
            Element::new("a1", ElementType::Action, "Rain streaks the window."),
            Element::new("c1", ElementType::Character, "MAYA"),
            Element::new("p1", ElementType::Parenthetical, "(quietly)"),
            Element::new("d1", ElementType::Dialogue, "We should go.").with_character("MAYA"),
            Element::new("t1", ElementType::Transition, "CUT TO:"),
        ];
        let result = paginate(&elements, &default_config()).unwrap();
        assert_eq!(result.page_count(), 1);
        assert_eq!(result.pages[0].identifier, PageIdentifier::sequential(1));
        assert_eq!(result.element_positions.len(), 6);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.stats.element_count, 6);
        assert_eq!(result.stats.page_break_count, 0);
    }

    #[test]
    fn test_empty_document() {
        let result = paginate(&[], &default_config()).unwrap();
        assert_eq!(result.page_count(), 1);
        assert!(result.pages[0].elements.is_empty());
        assert!(result.element_positions.is_empty());
    }

    #[test]
    fn test_duplicate_ids_fail() {
        let elements = vec![
            Element::new("x", ElementType::Action, "One."),
            Element::new("x", ElementType::Action, "Two."),
        ];
        let err = paginate(&elements, &default_config()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_empty_id_fails() {
        let elements = vec![Element::new("", ElementType::Action, "One.")];
        assert!(paginate(&elements, &default_config()).is_err());
    }

    #[test]
    fn test_long_action_spans_two_pages() {
        let elements = vec![Element::new("a", ElementType::Action, lines_of(60))];
        let result = paginate(&elements, &default_config()).unwrap();
        assert_eq!(result.page_count(), 2);
        assert!(result.has_warning(WarningKind::ElementExceedsPage, "a"));
        let position = result.position("a").unwrap();
        assert_eq!(
            position.line_ranges,
            [LineRange::new(0, 55), LineRange::new(55, 60)]
        );
    }

    #[test]
    fn test_huge_config_values_are_clamped() {
        let config: PageConfig = serde_json::from_str(
            r#"{
                "linesPerPage": 10,
                "elementStyles": {"action": {"spaceBefore": 4294967295, "spaceAfter": 4294967295}},
                "orphanControl": {
                    "dialogueMinBeforeSplit": 4294967295,
                    "dialogueMinAfterSplit": 4294967295,
                    "sceneHeadingMinFollowing": 4294967295
                }
            }"#,
        )
        .unwrap();
        let elements = vec![
            Element::new("a", ElementType::Action, "One."),
            Element::new("b", ElementType::Action, "Two."),
            Element::new("c", ElementType::Action, "Three."),
        ];
        let result = paginate(&elements, &config).unwrap();
        let starts: Vec<u32> = result.pages[0].elements.iter().map(|e| e.start_line).collect();
        assert_eq!(starts, [0, 1, 2]);
        assert_eq!(result.pages[0].lines_used, 3);
        let config_warnings = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::InvalidConfig)
            .count();
        assert_eq!(config_warnings, 3, "{:?}", result.warnings);
    }

    #[test]
    fn test_huge_lines_per_page_is_clamped() {
        let config: PageConfig =
            serde_json::from_str(r#"{"linesPerPage": 4294967295}"#).unwrap();
        let elements = vec![Element::new("a", ElementType::Action, lines_of(3))];
        let result = paginate(&elements, &config).unwrap();
        assert_eq!(result.page_count(), 1);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::InvalidConfig && w.message.contains("linesPerPage")));
    }

    #[test]
    fn test_partial_dialogue_style_still_splits() {
        let config: PageConfig = serde_json::from_str(
            r#"{"linesPerPage": 12, "elementStyles": {"dialogue": {"maxCharsPerLine": 30}}}"#,
        )
        .unwrap();
        let elements = vec![
            Element::new("a", ElementType::Action, lines_of(6)),
            Element::new("c", ElementType::Character, "JO"),
            Element::new("d", ElementType::Dialogue, lines_of(8)).with_character("JO"),
        ];
        let result = paginate(&elements, &config).unwrap();
        let dialogue = result.position("d").unwrap();
        assert!(dialogue.is_split);
        assert_eq!(dialogue.pages.len(), 2);
        assert!(result.pages[0].bottom_continuation.is_some());
    }

    #[test]
    fn test_speech_moves_when_dialogue_cannot_split() {
        let mut config = default_config();
        config.lines_per_page = 20;
        config.orphan_control.dialogue_min_before_split = 4;
        let elements = vec![
            Element::new("a", ElementType::Action, lines_of(15)),
            Element::new("c", ElementType::Character, "JO"),
            Element::new("d", ElementType::Dialogue, lines_of(6)).with_character("JO"),
        ];
        // cue on line 16 leaves 3 lines for dialogue, below the minimum of 4
        let result = paginate(&elements, &config).unwrap();
        assert_eq!(result.position("c").unwrap().pages, [1]);
        assert_eq!(result.position("d").unwrap().pages, [1]);
        assert!(!result.has_warning(WarningKind::UnpreventableOrphan, "c"));
    }

    #[test]
    fn test_dual_columns_line_up() {
        let elements = vec![
            Element::new("l", ElementType::DualDialogueLeft, lines_of(5)),
            Element::new("r", ElementType::DualDialogueRight, lines_of(3)),
        ];
        let result = paginate(&elements, &default_config()).unwrap();
        let page = &result.pages[0];
        let left = page.column(DualSide::Left).next().unwrap();
        let right = page.column(DualSide::Right).next().unwrap();
        assert_eq!(right.line_count, 3);
        assert_eq!(right.pad_lines, 2);
        assert_eq!(left.end_line(), right.end_line());
    }

    #[test]
    fn test_forced_break() {
        let elements = vec![
            Element::new("a", ElementType::Action, "Before.").with_page_break_after(),
            Element::new("b", ElementType::Action, "After."),
        ];
        let result = paginate(&elements, &default_config()).unwrap();
        assert_eq!(result.page_count(), 2);
        assert_eq!(result.position("b").unwrap().pages, [1]);
        assert_eq!(result.position("b").unwrap().start_line, 0);
    }

    #[test]
    fn test_result_is_deterministic() {
        let elements: Vec<Element> = (0..40)
            .map(|i| {
                let ty = ElementType::ALL[i % 7];
                Element::new(format!("e{}", i), ty, lines_of(i % 5 + 1)).with_character("AL")
            })
            .collect();
        let config = default_config();
        let a = serde_json::to_string(&paginate(&elements, &config).unwrap()).unwrap();
        let b = serde_json::to_string(&paginate(&elements, &config).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
