//! Result assembly: numbered pages, element positions, warnings and stats

use crate::layout::engine::{LayoutOutcome, Measured};
use crate::layout::numbering::number_pages;
use crate::model::{
    EffectiveConfig, ElementId, ElementPosition, PaginationResult, PaginationStats,
    PaginationWarning, WarningKind,
};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Turn the engine's physical pages into the final result.
///
/// `warnings` holds what configuration validation already reported; it comes
/// first in the result, followed by numbering, layout and content warnings.
pub fn aggregate(
    items: &[Measured<'_>],
    config: &EffectiveConfig,
    outcome: LayoutOutcome,
    mut warnings: Vec<PaginationWarning>,
) -> PaginationResult {
    let physical_count = outcome.pages.len();
    let numbered = number_pages(outcome.pages, config, &mut warnings);

    for mut warning in outcome.warnings {
        warning.page_index = warning.page_index.map(|p| numbered.final_index(p));
        warnings.push(warning);
    }

    let element_positions = positions(items, &numbered.pages);
    warnings.extend(content_warnings(items, config, &element_positions));

    let stats = PaginationStats {
        page_count: numbered.pages.len(),
        element_count: items.len(),
        page_break_count: physical_count.saturating_sub(1),
        split_count: element_positions.values().filter(|p| p.is_split).count(),
        continuation_count: outcome.continuation_count,
        duration_micros: 0,
    };

    PaginationResult {
        pages: numbered.pages,
        element_positions,
        warnings,
        stats,
    }
}

fn positions(
    items: &[Measured<'_>],
    pages: &[crate::model::Page],
) -> BTreeMap<ElementId, ElementPosition> {
    let totals: FxHashMap<&ElementId, u32> = items
        .iter()
        .map(|item| (&item.element.id, item.lines()))
        .collect();
    let mut out: BTreeMap<ElementId, ElementPosition> = BTreeMap::new();

    for (page_index, page) in pages.iter().enumerate() {
        for placed in &page.elements {
            // CONT'D cues repeat the speaker, they carry none of the text
            let Some(range) = placed.line_range else {
                continue;
            };
            let end_line = placed.start_line + placed.line_count;
            let position = out
                .entry(placed.element_id.clone())
                .or_insert_with(|| ElementPosition {
                    pages: Vec::new(),
                    start_line: placed.start_line,
                    end_line,
                    is_split: false,
                    line_ranges: Vec::new(),
                    total_lines: totals.get(&placed.element_id).copied().unwrap_or(0),
                });
            if position.pages.last() != Some(&page_index) {
                position.pages.push(page_index);
            }
            position.line_ranges.push(range);
            position.end_line = end_line;
            position.is_split = position.pages.len() > 1;
        }
    }
    out
}

fn content_warnings(
    items: &[Measured<'_>],
    config: &EffectiveConfig,
    positions: &BTreeMap<ElementId, ElementPosition>,
) -> Vec<PaginationWarning> {
    let mut out = Vec::new();
    for item in items {
        let id = &item.element.id;
        let page = positions
            .get(id)
            .and_then(|p| p.pages.first())
            .copied()
            .unwrap_or(0);

        if item.element.dual_side().is_none() && item.rows() > config.lines_per_page {
            out.push(PaginationWarning::element(
                WarningKind::ElementExceedsPage,
                id.clone(),
                page,
                format!(
                    "{} needs {} lines; a page holds {}",
                    item.kind(),
                    item.rows(),
                    config.lines_per_page
                ),
            ));
        }
        if item.wrapped.has_overflow() {
            out.push(PaginationWarning::element(
                WarningKind::LineOverflow,
                id.clone(),
                page,
                format!(
                    "a word is wider than the {}-character {} line",
                    item.style.max_chars,
                    item.kind()
                ),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::engine::BreakEngine;
    use crate::layout::line_break::LineWrapper;
    use crate::model::{Element, ElementType, LineRange, PageConfig};

    fn lines_of(lines: usize) -> String {
        vec!["line"; lines].join("\n")
    }

    fn run(elements: &[Element], config: &PageConfig) -> PaginationResult {
        let mut warnings = Vec::new();
        let effective = config.resolve(&mut warnings);
        let wrapper = LineWrapper::new();
        let items: Vec<Measured> = elements
            .iter()
            .map(|e| Measured::measure(e, &effective, &wrapper))
            .collect();
        let outcome = BreakEngine::new(&effective, &items).run();
        aggregate(&items, &effective, outcome, warnings)
    }

    #[test]
    fn test_oversized_action_is_reported() {
        let elements = vec![Element::new("a", ElementType::Action, lines_of(60))];
        let result = run(&elements, &PageConfig::feature_film());
        assert_eq!(result.page_count(), 2);
        assert!(result.has_warning(WarningKind::ElementExceedsPage, "a"));

        let position = result.position("a").unwrap();
        assert_eq!(position.pages, [0, 1]);
        assert_eq!(
            position.line_ranges,
            [LineRange::new(0, 55), LineRange::new(55, 60)]
        );
        assert!(position.is_split);
        assert_eq!(position.total_lines, 60);
        assert_eq!(position.end_line, 5);
        assert_eq!(result.stats.split_count, 1);
        assert_eq!(result.stats.page_break_count, 1);
    }

    #[test]
    fn test_line_overflow_is_reported() {
        let elements = vec![Element::new(
            "t",
            ElementType::Transition,
            "SUPERCALIFRAGILISTICEXPIALIDOCIOUSLY:",
        )];
        let result = run(&elements, &PageConfig::feature_film());
        assert!(result.has_warning(WarningKind::LineOverflow, "t"));
        assert_eq!(result.position("t").unwrap().total_lines, 1);
    }

    #[test]
    fn test_cue_lines_are_not_positions() {
        let mut config = PageConfig::feature_film();
        config.lines_per_page = 12;
        let elements = vec![
            Element::new("a", ElementType::Action, lines_of(4)),
            Element::new("c", ElementType::Character, "ANNA"),
            Element::new("d", ElementType::Dialogue, lines_of(8)).with_character("Anna"),
        ];
        let result = run(&elements, &config);
        let position = result.position("d").unwrap();
        assert_eq!(
            position.line_ranges,
            [LineRange::new(0, 5), LineRange::new(5, 8)]
        );
        // text resumes under the CONT'D cue
        assert_eq!(position.end_line, 4);
        assert_eq!(result.stats.continuation_count, 1);
    }

    #[test]
    fn test_warning_pages_follow_omitted_placeholders() {
        let mut config = PageConfig::feature_film();
        config.numbering.omitted_pages = vec![2];
        let elements = vec![
            Element::new("a", ElementType::Action, "Page one.").with_page_break_after(),
            Element::new("t", ElementType::Transition, "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXX"),
        ];
        let result = run(&elements, &config);
        assert_eq!(result.page_count(), 3);
        let warning = result.warnings_of(WarningKind::LineOverflow).next().unwrap();
        assert_eq!(warning.page_index, Some(2));
        assert_eq!(result.position("t").unwrap().pages, [2]);
        assert_eq!(result.stats.page_count, 3);
        assert_eq!(result.stats.page_break_count, 1);
    }

    #[test]
    fn test_lines_are_conserved() {
        let mut config = PageConfig::feature_film();
        config.lines_per_page = 9;
        let elements: Vec<Element> = (0..12)
            .map(|i| Element::new(format!("e{}", i), ElementType::Action, lines_of(i % 7 + 1)))
            .collect();
        let result = run(&elements, &config);
        assert_eq!(result.element_positions.len(), elements.len());
        for position in result.element_positions.values() {
            let mut next = 0;
            for range in &position.line_ranges {
                assert_eq!(range.start, next);
                next = range.end;
            }
            assert_eq!(next, position.total_lines);
        }
    }
}
