//! Page configuration, presets and validation
//!
//! `PageConfig` is what the host sends. Before pagination it is resolved into
//! an [`EffectiveConfig`]: missing styles are filled in from the preset, out
//! of range values are clamped, and every correction is reported as an
//! `invalid_config` warning instead of failing the request.

use crate::layout::TextMetrics;
use crate::model::element::ElementType;
use crate::model::result::PaginationWarning;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Inches to points
const INCH: f32 = 72.0;

/// Upper bound on `linesPerPage`; keeps all line arithmetic well inside `u32`
pub const MAX_LINES_PER_PAGE: u32 = 1000;

/// Paper sizes supported by the layout rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperSize {
    #[default]
    UsLetter,
    A4,
}

impl PaperSize {
    /// Width and height in points
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PaperSize::UsLetter => (612.0, 792.0),
            PaperSize::A4 => (595.28, 841.89),
        }
    }
}

/// Page margins in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        // 1.5" binding edge on the left, 55 lines of 12pt text vertically
        Self {
            top: INCH,
            bottom: 60.0,
            left: 1.5 * INCH,
            right: INCH,
        }
    }
}

/// Layout rules for one element type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementStyle {
    /// Indent from the left edge of the text area, in points
    pub left_margin: f32,
    /// Indent from the right edge of the text area, in points
    pub right_margin: f32,
    /// Characters per line; 0 derives it from the margins
    pub max_chars_per_line: u32,
    /// Blank lines before the element (dropped at the top of a page)
    pub space_before: u32,
    /// Blank lines after the element (truncated at the bottom of a page)
    pub space_after: u32,
    /// Page lines per wrapped line
    pub line_spacing: u32,
    pub can_split: bool,
    pub min_lines_before_split: u32,
    pub min_lines_after_split: u32,
    pub keep_with_next: bool,
    pub keep_with_next_lines: u32,
    pub force_uppercase: bool,
    /// Always start this element on a fresh page
    pub new_page_before: bool,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            left_margin: 0.0,
            right_margin: 0.0,
            max_chars_per_line: 0,
            space_before: 1,
            space_after: 0,
            line_spacing: 1,
            can_split: false,
            min_lines_before_split: 1,
            min_lines_after_split: 1,
            keep_with_next: false,
            keep_with_next_lines: 0,
            force_uppercase: false,
            new_page_before: false,
        }
    }
}

impl ElementStyle {
    fn indented(left_in: f32, right_in: f32) -> Self {
        Self {
            left_margin: left_in * INCH,
            right_margin: right_in * INCH,
            ..Self::default()
        }
    }

    fn splittable(mut self, before: u32, after: u32) -> Self {
        self.can_split = true;
        self.min_lines_before_split = before;
        self.min_lines_after_split = after;
        self
    }

    fn keep_next(mut self, lines: u32) -> Self {
        self.keep_with_next = true;
        self.keep_with_next_lines = lines;
        self
    }

    fn spacing(mut self, before: u32) -> Self {
        self.space_before = before;
        self
    }

    fn uppercase(mut self) -> Self {
        self.force_uppercase = true;
        self
    }
}

/// Per-type style override as sent by the host
///
/// Fields left out keep the preset's value for that element type.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StylePatch {
    left_margin: Option<f32>,
    right_margin: Option<f32>,
    max_chars_per_line: Option<u32>,
    space_before: Option<u32>,
    space_after: Option<u32>,
    line_spacing: Option<u32>,
    can_split: Option<bool>,
    min_lines_before_split: Option<u32>,
    min_lines_after_split: Option<u32>,
    keep_with_next: Option<bool>,
    keep_with_next_lines: Option<u32>,
    force_uppercase: Option<bool>,
    new_page_before: Option<bool>,
}

impl StylePatch {
    fn apply(self, base: ElementStyle) -> ElementStyle {
        ElementStyle {
            left_margin: self.left_margin.unwrap_or(base.left_margin),
            right_margin: self.right_margin.unwrap_or(base.right_margin),
            max_chars_per_line: self.max_chars_per_line.unwrap_or(base.max_chars_per_line),
            space_before: self.space_before.unwrap_or(base.space_before),
            space_after: self.space_after.unwrap_or(base.space_after),
            line_spacing: self.line_spacing.unwrap_or(base.line_spacing),
            can_split: self.can_split.unwrap_or(base.can_split),
            min_lines_before_split: self
                .min_lines_before_split
                .unwrap_or(base.min_lines_before_split),
            min_lines_after_split: self.min_lines_after_split.unwrap_or(base.min_lines_after_split),
            keep_with_next: self.keep_with_next.unwrap_or(base.keep_with_next),
            keep_with_next_lines: self.keep_with_next_lines.unwrap_or(base.keep_with_next_lines),
            force_uppercase: self.force_uppercase.unwrap_or(base.force_uppercase),
            new_page_before: self.new_page_before.unwrap_or(base.new_page_before),
        }
    }
}

/// Overlay each `elementStyles` entry on the Feature Film style of its type
fn overlay_styles<'de, D>(deserializer: D) -> Result<BTreeMap<ElementType, ElementStyle>, D::Error>
where
    D: Deserializer<'de>,
{
    let patches = BTreeMap::<ElementType, StylePatch>::deserialize(deserializer)?;
    Ok(patches
        .into_iter()
        .map(|(ty, patch)| (ty, patch.apply(Preset::FeatureFilm.style(ty))))
        .collect())
}

/// Markers written around a dialogue page break
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContinuationStyle {
    pub more_marker: String,
    pub contd_marker: String,
    pub enabled: bool,
}

impl Default for ContinuationStyle {
    fn default() -> Self {
        Self {
            more_marker: "(MORE)".to_string(),
            contd_marker: "(CONT'D)".to_string(),
            enabled: true,
        }
    }
}

impl ContinuationStyle {
    /// Cue line heading the continued part of a speech
    pub fn contd_cue(&self, character_name: &str) -> String {
        format!("{} {}", character_name.trim().to_uppercase(), self.contd_marker)
    }
}

/// Thresholds that keep headings and cues with their content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrphanControl {
    pub scene_heading_min_following: u32,
    pub character_min_dialogue_lines: u32,
    pub dialogue_min_before_split: u32,
    pub dialogue_min_after_split: u32,
}

impl Default for OrphanControl {
    fn default() -> Self {
        Self {
            scene_heading_min_following: 2,
            character_min_dialogue_lines: 2,
            dialogue_min_before_split: 2,
            dialogue_min_after_split: 2,
        }
    }
}

/// Revision numbering requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageNumbering {
    /// Physical page indices (0-based) to label as inserted pages
    pub inserted_pages: Vec<usize>,
    /// Page numbers that are skipped and shown as OMITTED
    pub omitted_pages: Vec<u32>,
}

/// Formatting preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    FeatureFilm,
    /// Sitcom format: double-spaced dialogue, acts start new pages
    MultiCamera,
}

impl Preset {
    /// Style for one element type under this preset
    pub fn style(self, ty: ElementType) -> ElementStyle {
        let film = match ty {
            ElementType::SceneHeading => ElementStyle::indented(0.0, 0.0).keep_next(2).uppercase(),
            ElementType::Action => ElementStyle::indented(0.0, 0.0).splittable(2, 2),
            ElementType::Character => ElementStyle::indented(2.2, 0.0).keep_next(1).uppercase(),
            ElementType::Parenthetical => ElementStyle::indented(1.6, 2.0).spacing(0).keep_next(1),
            ElementType::Dialogue => ElementStyle::indented(1.0, 1.5).spacing(0).splittable(2, 2),
            ElementType::Transition => ElementStyle::indented(4.0, 0.0).uppercase(),
            ElementType::Shot => ElementStyle::indented(0.0, 0.0).keep_next(1).uppercase(),
            ElementType::DualDialogueLeft => ElementStyle::indented(0.0, 3.2).splittable(1, 1),
            ElementType::DualDialogueRight => ElementStyle::indented(3.2, 0.0).splittable(1, 1),
            ElementType::ActBreak => ElementStyle::indented(2.0, 2.0).keep_next(1).uppercase(),
            ElementType::PageBreak => ElementStyle::indented(0.0, 0.0).spacing(0),
            ElementType::BlankLine => ElementStyle::indented(0.0, 0.0).spacing(0),
        };
        match (self, ty) {
            (Preset::FeatureFilm, _) => film,
            (Preset::MultiCamera, ElementType::Dialogue) => ElementStyle {
                line_spacing: 2,
                ..film
            },
            (Preset::MultiCamera, ElementType::Action) => film.uppercase(),
            (Preset::MultiCamera, ElementType::ActBreak) => ElementStyle {
                new_page_before: true,
                ..film
            },
            (Preset::MultiCamera, _) => film,
        }
    }

    pub fn config(self) -> PageConfig {
        PageConfig {
            paper_size: PaperSize::UsLetter,
            lines_per_page: 55,
            char_width_pt: TextMetrics::COURIER_12.char_width_pt,
            line_height_pt: TextMetrics::COURIER_12.line_height_pt,
            margins: Margins::default(),
            element_styles: ElementType::ALL
                .iter()
                .map(|&ty| (ty, self.style(ty)))
                .collect(),
            continuation_style: ContinuationStyle::default(),
            orphan_control: OrphanControl::default(),
            numbering: PageNumbering::default(),
        }
    }
}

/// Formatting configuration for one pagination request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub paper_size: PaperSize,
    /// Text lines per page; 0 derives it from paper size and margins
    pub lines_per_page: u32,
    pub char_width_pt: f32,
    pub line_height_pt: f32,
    pub margins: Margins,
    #[serde(deserialize_with = "overlay_styles")]
    pub element_styles: BTreeMap<ElementType, ElementStyle>,
    pub continuation_style: ContinuationStyle,
    pub orphan_control: OrphanControl,
    pub numbering: PageNumbering,
}

impl Default for PageConfig {
    fn default() -> Self {
        Preset::FeatureFilm.config()
    }
}

impl PageConfig {
    /// The "Feature Film" preset
    pub fn feature_film() -> Self {
        Preset::FeatureFilm.config()
    }

    pub fn style(&self, ty: ElementType) -> ElementStyle {
        self.element_styles
            .get(&ty)
            .copied()
            .unwrap_or_else(|| Preset::FeatureFilm.style(ty))
    }

    pub fn style_mut(&mut self, ty: ElementType) -> &mut ElementStyle {
        self.element_styles
            .entry(ty)
            .or_insert_with(|| Preset::FeatureFilm.style(ty))
    }

    /// Clamp and complete this configuration for the layout engine
    pub fn resolve(&self, warnings: &mut Vec<PaginationWarning>) -> EffectiveConfig {
        let mut metrics = TextMetrics::new(self.char_width_pt, self.line_height_pt);
        if !metrics.is_valid() {
            warnings.push(PaginationWarning::config(format!(
                "charWidthPt {} / lineHeightPt {} must be positive; using 12pt Courier metrics",
                self.char_width_pt, self.line_height_pt
            )));
            metrics = TextMetrics::COURIER_12;
        }

        let margins = clamp_margins(self.margins, warnings);
        let (page_width, page_height) = self.paper_size.dimensions();
        let text_width = page_width - margins.left - margins.right;

        let mut lines_per_page = self.lines_per_page;
        if lines_per_page == 0 {
            lines_per_page = metrics.lines_for_height(page_height - margins.top - margins.bottom);
            if lines_per_page == 0 {
                lines_per_page = Preset::FeatureFilm.config().lines_per_page;
            }
            warnings.push(PaginationWarning::config(format!(
                "linesPerPage is 0; derived {} from the page geometry",
                lines_per_page
            )));
        }
        if lines_per_page > MAX_LINES_PER_PAGE {
            warnings.push(PaginationWarning::config(format!(
                "linesPerPage {} is out of range; clamped to {}",
                lines_per_page, MAX_LINES_PER_PAGE
            )));
            lines_per_page = MAX_LINES_PER_PAGE;
        }

        let styles = ElementType::ALL.map(|ty| {
            resolve_style(ty, self.style(ty), metrics, text_width, lines_per_page, warnings)
        });

        let orphan = resolve_orphan(self.orphan_control, lines_per_page, warnings);
        let continuation = resolve_continuation(&self.continuation_style, warnings);

        EffectiveConfig {
            lines_per_page,
            metrics,
            styles,
            continuation,
            orphan,
            inserted_pages: self.numbering.inserted_pages.iter().copied().collect(),
            omitted_pages: self.numbering.omitted_pages.iter().copied().collect(),
        }
    }
}

fn clamp_margins(margins: Margins, warnings: &mut Vec<PaginationWarning>) -> Margins {
    let fix = |name: &str, value: f32, warnings: &mut Vec<PaginationWarning>| {
        if value.is_finite() && value >= 0.0 {
            value
        } else {
            warnings.push(PaginationWarning::config(format!(
                "margin {} is {}; using 0",
                name, value
            )));
            0.0
        }
    };
    Margins {
        top: fix("top", margins.top, warnings),
        bottom: fix("bottom", margins.bottom, warnings),
        left: fix("left", margins.left, warnings),
        right: fix("right", margins.right, warnings),
    }
}

/// Shrink a before/after pair so that both fit on one page
fn clamp_pair(before: u32, after: u32, lines_per_page: u32) -> (u32, u32) {
    if before.saturating_add(after) <= lines_per_page {
        return (before, after);
    }
    let before = before.min(lines_per_page / 2).max(1).min(lines_per_page);
    let after = after.min(lines_per_page - before);
    (before, after)
}

fn resolve_style(
    ty: ElementType,
    style: ElementStyle,
    metrics: TextMetrics,
    text_width: f32,
    lines_per_page: u32,
    warnings: &mut Vec<PaginationWarning>,
) -> EffectiveStyle {
    let mut max_chars = style.max_chars_per_line;
    if max_chars == 0 && ty != ElementType::PageBreak {
        let indent = style.left_margin.max(0.0) + style.right_margin.max(0.0);
        max_chars = metrics.chars_for_width(text_width - indent);
        if max_chars == 0 {
            warnings.push(PaginationWarning::config(format!(
                "{} margins leave no room for text; using 1 character per line",
                ty
            )));
        }
    }
    let max_chars = max_chars.max(1);

    let mut line_spacing = style.line_spacing;
    if line_spacing == 0 || line_spacing > lines_per_page {
        warnings.push(PaginationWarning::config(format!(
            "{} lineSpacing {} is out of range; using 1",
            ty, style.line_spacing
        )));
        line_spacing = 1;
    }

    let (mut space_before, mut space_after) = (style.space_before, style.space_after);
    let spacing = space_before
        .saturating_add(space_after)
        .saturating_add(line_spacing);
    if spacing > lines_per_page {
        warnings.push(PaginationWarning::config(format!(
            "{} spacing ({} before, {} after) does not fit a {}-line page; dropping it",
            ty, space_before, space_after, lines_per_page
        )));
        space_before = 0;
        space_after = 0;
    }

    let (min_before, min_after) = clamp_pair(
        style.min_lines_before_split,
        style.min_lines_after_split,
        lines_per_page,
    );
    if (min_before, min_after) != (style.min_lines_before_split, style.min_lines_after_split) {
        warnings.push(PaginationWarning::config(format!(
            "{} split minimums {}+{} exceed {} lines per page; clamped to {}+{}",
            ty,
            style.min_lines_before_split,
            style.min_lines_after_split,
            lines_per_page,
            min_before,
            min_after
        )));
    }

    let mut keep_lines = if style.keep_with_next {
        style.keep_with_next_lines.max(1)
    } else {
        0
    };
    if keep_lines >= lines_per_page {
        warnings.push(PaginationWarning::config(format!(
            "{} keepWithNextLines {} exceeds the page; clamped",
            ty, keep_lines
        )));
        keep_lines = lines_per_page.saturating_sub(1);
    }

    EffectiveStyle {
        max_chars,
        space_before,
        space_after,
        line_spacing,
        can_split: style.can_split,
        min_before,
        min_after,
        keep_with_next_lines: keep_lines,
        force_uppercase: style.force_uppercase,
        new_page_before: style.new_page_before,
    }
}

fn resolve_orphan(
    orphan: OrphanControl,
    lines_per_page: u32,
    warnings: &mut Vec<PaginationWarning>,
) -> OrphanControl {
    let mut out = orphan;
    let (before, after) = clamp_pair(
        orphan.dialogue_min_before_split,
        orphan.dialogue_min_after_split,
        lines_per_page,
    );
    if (before, after) != (orphan.dialogue_min_before_split, orphan.dialogue_min_after_split) {
        warnings.push(PaginationWarning::config(format!(
            "dialogue split minimums {}+{} exceed {} lines per page; clamped to {}+{}",
            orphan.dialogue_min_before_split,
            orphan.dialogue_min_after_split,
            lines_per_page,
            before,
            after
        )));
        out.dialogue_min_before_split = before;
        out.dialogue_min_after_split = after;
    }

    let limit = lines_per_page.saturating_sub(1);
    if orphan.scene_heading_min_following > limit {
        warnings.push(PaginationWarning::config(format!(
            "sceneHeadingMinFollowing {} exceeds the page; clamped to {}",
            orphan.scene_heading_min_following, limit
        )));
        out.scene_heading_min_following = limit;
    }
    if orphan.character_min_dialogue_lines > limit {
        warnings.push(PaginationWarning::config(format!(
            "characterMinDialogueLines {} exceeds the page; clamped to {}",
            orphan.character_min_dialogue_lines, limit
        )));
        out.character_min_dialogue_lines = limit;
    }
    out
}

fn resolve_continuation(
    style: &ContinuationStyle,
    warnings: &mut Vec<PaginationWarning>,
) -> ContinuationStyle {
    let defaults = ContinuationStyle::default();
    let mut out = style.clone();
    if style.enabled && style.more_marker.trim().is_empty() {
        warnings.push(PaginationWarning::config("moreMarker is empty; using (MORE)"));
        out.more_marker = defaults.more_marker;
    }
    if style.enabled && style.contd_marker.trim().is_empty() {
        warnings.push(PaginationWarning::config("contdMarker is empty; using (CONT'D)"));
        out.contd_marker = defaults.contd_marker;
    }
    out
}

/// Style after validation, in whole lines and characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveStyle {
    pub max_chars: u32,
    pub space_before: u32,
    pub space_after: u32,
    pub line_spacing: u32,
    pub can_split: bool,
    pub min_before: u32,
    pub min_after: u32,
    /// 0 when the style does not keep with the next element
    pub keep_with_next_lines: u32,
    pub force_uppercase: bool,
    pub new_page_before: bool,
}

/// Validated configuration consumed by the layout engine
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub lines_per_page: u32,
    pub metrics: TextMetrics,
    styles: [EffectiveStyle; 12],
    pub continuation: ContinuationStyle,
    pub orphan: OrphanControl,
    pub inserted_pages: BTreeSet<usize>,
    pub omitted_pages: BTreeSet<u32>,
}

impl EffectiveConfig {
    pub fn style(&self, ty: ElementType) -> &EffectiveStyle {
        &self.styles[ty.index()]
    }
}
