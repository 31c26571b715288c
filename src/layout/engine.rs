//! Break-decision engine
//!
//! Walks the measured element stream once, filling pages top to bottom. For
//! every element it decides between placing it whole, splitting it, or
//! moving it to the next page, guided by the keep-together and orphan rules
//! of the effective configuration. Dual-dialogue runs are handed to
//! [`super::dual`].

use crate::layout::line_break::{LineWrapper, WrappedText};
use crate::model::{
    DualSide, EffectiveConfig, EffectiveStyle, Element, ElementType, LineRange, PageElement,
    PaginationWarning, WarningKind,
};
use std::ops::Range;
use tracing::trace;

/// An element with its wrapped text and resolved style
#[derive(Debug, Clone)]
pub struct Measured<'a> {
    pub element: &'a Element,
    pub style: EffectiveStyle,
    pub wrapped: WrappedText,
}

impl<'a> Measured<'a> {
    /// Wrap `element` according to its style. Dual-dialogue members are
    /// limited to their column width.
    pub fn measure(element: &'a Element, config: &EffectiveConfig, wrapper: &LineWrapper) -> Self {
        let style = *config.style(element.element_type);
        if element.element_type == ElementType::PageBreak {
            return Self {
                element,
                style,
                wrapped: WrappedText::empty(),
            };
        }
        let mut max_chars = style.max_chars;
        if let Some(side) = element.dual_side() {
            let column_type = match side {
                DualSide::Left => ElementType::DualDialogueLeft,
                DualSide::Right => ElementType::DualDialogueRight,
            };
            max_chars = max_chars.min(config.style(column_type).max_chars);
        }
        let wrapped = wrapper.wrap(&element.content, max_chars, style.force_uppercase);
        Self {
            element,
            style,
            wrapped,
        }
    }

    /// Wrapped text lines
    pub fn lines(&self) -> u32 {
        self.wrapped.line_count()
    }

    /// Page lines occupied by the text
    pub fn rows(&self) -> u32 {
        self.lines().saturating_mul(self.style.line_spacing)
    }

    pub fn kind(&self) -> ElementType {
        self.element.element_type
    }
}

/// A page while it is being filled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDraft {
    pub elements: Vec<PageElement>,
    pub bottom_continuation: Option<String>,
    pub lines_used: u32,
}

impl PageDraft {
    /// Elements placed in one dual column
    pub fn column(&self, side: DualSide) -> impl Iterator<Item = &PageElement> {
        self.elements.iter().filter(move |e| e.column == Some(side))
    }
}

/// Physical pages plus what the engine noticed on the way
#[derive(Debug, Default)]
pub struct LayoutOutcome {
    pub pages: Vec<PageDraft>,
    pub warnings: Vec<PaginationWarning>,
    pub continuation_count: usize,
}

/// Where to break a too-long element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Split {
    /// Wrapped lines kept on the current page
    pub lines: u32,
    /// A MORE marker closes the page
    pub marker: bool,
}

/// Page-filling state machine
pub struct BreakEngine<'a> {
    pub(crate) config: &'a EffectiveConfig,
    pub(crate) items: &'a [Measured<'a>],
    pub(crate) pages: Vec<PageDraft>,
    pub(crate) current: PageDraft,
    /// The previous element asked for a page break after itself
    pub(crate) break_pending: bool,
    pub(crate) warnings: Vec<PaginationWarning>,
    continuation_count: usize,
}

impl<'a> BreakEngine<'a> {
    pub fn new(config: &'a EffectiveConfig, items: &'a [Measured<'a>]) -> Self {
        Self {
            config,
            items,
            pages: Vec::new(),
            current: PageDraft::default(),
            break_pending: false,
            warnings: Vec::new(),
            continuation_count: 0,
        }
    }

    /// Lay out every element and return the physical pages
    pub fn run(mut self) -> LayoutOutcome {
        let mut i = 0;
        while i < self.items.len() {
            if self.items[i].element.dual_side().is_some() {
                let end = self.dual_run_end(i);
                self.place_dual(i..end);
                i = end;
            } else {
                self.place_single(i);
                i += 1;
            }
        }

        // Zero-line leftovers (trailing breaks) stay on the last real page
        let last = std::mem::take(&mut self.current);
        match self.pages.last_mut() {
            Some(previous) if last.lines_used == 0 => {
                for mut placed in last.elements {
                    placed.start_line = previous.lines_used;
                    previous.elements.push(placed);
                }
            }
            _ => self.pages.push(last),
        }

        LayoutOutcome {
            pages: self.pages,
            warnings: self.warnings,
            continuation_count: self.continuation_count,
        }
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.config.lines_per_page
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.capacity().saturating_sub(self.current.lines_used)
    }

    pub(crate) fn at_top(&self) -> bool {
        self.current.lines_used == 0
    }

    pub(crate) fn page_index(&self) -> usize {
        self.pages.len()
    }

    /// Close the current page. A page without any lines is kept open so a
    /// break never produces a blank page.
    pub(crate) fn new_page(&mut self) {
        if self.current.lines_used == 0 {
            return;
        }
        trace!(page = self.pages.len(), lines = self.current.lines_used, "page closed");
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
    }

    /// Honor a pending forced break or the element's own `new_page_before`
    pub(crate) fn open_for(&mut self, item: &Measured<'_>) {
        if self.break_pending || item.style.new_page_before {
            self.new_page();
        }
        self.break_pending = false;
    }

    fn dual_run_end(&self, start: usize) -> usize {
        let mut end = start + 1;
        while end < self.items.len()
            && self.items[end].element.dual_side().is_some()
            && !self.items[end - 1].element.breaks_after()
        {
            end += 1;
        }
        end
    }

    fn warn(&mut self, kind: WarningKind, index: usize, message: String) {
        let id = self.items[index].element.id.clone();
        let page = self.page_index();
        self.warnings.push(PaginationWarning::element(kind, id, page, message));
    }

    fn place_single(&mut self, index: usize) {
        let items = self.items;
        let item = &items[index];
        self.open_for(item);

        if item.kind() == ElementType::PageBreak {
            let mut placed = PageElement::new(item.element.id.clone(), self.current.lines_used, 0);
            placed.line_range = Some(LineRange::new(0, 0));
            self.current.elements.push(placed);
            self.break_pending = true;
            return;
        }

        if !self.at_top() {
            let need = item.style.space_before + item.rows();
            let remaining = self.remaining();
            if need <= remaining {
                let room = remaining - need - item.style.space_after.min(remaining - need);
                if self.followers_ok(index, room) {
                    self.place_whole(index);
                    return;
                }
                if !self.followers_ok(index, self.top_room_after(item)) {
                    self.warn(
                        WarningKind::UnpreventableOrphan,
                        index,
                        format!("{} cannot be kept with what follows", item.kind()),
                    );
                    self.place_whole(index);
                    return;
                }
                trace!(element = %item.element.id, "moved to keep with following lines");
                self.new_page();
            } else if item.style.can_split {
                let room = remaining.saturating_sub(item.style.space_before);
                match self.split_point(item, item.lines(), room, false) {
                    Some(split) => {
                        self.place_split(index, split);
                        return;
                    }
                    None => {
                        trace!(element = %item.element.id, "no valid split, moved whole");
                        self.new_page();
                    }
                }
            } else {
                self.new_page();
            }
        }

        // Top of a fresh page
        if item.rows() <= self.capacity() {
            if !self.followers_ok(index, self.top_room_after(item)) {
                self.warn(
                    WarningKind::UnpreventableOrphan,
                    index,
                    format!("{} cannot be kept with what follows", item.kind()),
                );
            }
            self.place_whole(index);
        } else {
            let room = self.capacity();
            let split = self
                .split_point(item, item.lines(), room, true)
                .unwrap_or(Split { lines: 1, marker: false });
            self.place_split(index, split);
        }
    }

    /// Rows left on an empty page after placing `item` there
    fn top_room_after(&self, item: &Measured<'_>) -> u32 {
        self.capacity()
            .saturating_sub(item.rows())
            .saturating_sub(item.style.space_after)
    }

    fn place_whole(&mut self, index: usize) {
        let items = self.items;
        let item = &items[index];
        let start = if self.at_top() {
            0
        } else {
            self.current.lines_used + item.style.space_before
        };
        let mut placed = PageElement::new(item.element.id.clone(), start, item.rows());
        placed.line_range = Some(LineRange::new(0, item.lines()));
        self.current.elements.push(placed);
        self.current.lines_used = (start + item.rows() + item.style.space_after).min(self.capacity());
        self.break_pending = item.element.breaks_after();
    }

    /// Place an element across pages, `first.lines` of it on the current one
    fn place_split(&mut self, index: usize, first: Split) {
        let items = self.items;
        let item = &items[index];
        let total = item.lines();
        let spacing = item.style.line_spacing;
        let mut start = 0;
        let mut split = first;

        loop {
            // later pieces open a page, possibly under a CONT'D cue
            let top = if start == 0 && !self.at_top() {
                self.current.lines_used + item.style.space_before
            } else {
                self.current.lines_used
            };
            let range = LineRange::new(start, start + split.lines);
            let mut placed = PageElement::new(item.element.id.clone(), top, split.lines * spacing);
            placed.is_continuation = start > 0;
            placed.line_range = Some(range);
            placed.text_range = item.wrapped.text_range(range);
            self.current.elements.push(placed);
            self.current.lines_used = top + split.lines * spacing;
            start = range.end;

            if start >= total {
                self.current.lines_used =
                    (self.current.lines_used + item.style.space_after).min(self.capacity());
                break;
            }

            let cue = if split.marker {
                self.current.bottom_continuation = Some(self.config.continuation.more_marker.clone());
                self.current.lines_used = (self.current.lines_used + 1).min(self.capacity());
                item.element
                    .character_name
                    .as_deref()
                    .map(|name| self.config.continuation.contd_cue(name))
            } else {
                None
            };

            trace!(element = %item.element.id, at_line = start, "element split");
            self.new_page();

            if let Some(prefix) = cue {
                let mut placed = PageElement::new(item.element.id.clone(), 0, 1);
                placed.is_continuation = true;
                placed.continuation_prefix = Some(prefix);
                self.current.elements.push(placed);
                self.current.lines_used = 1;
                self.continuation_count += 1;
            }

            let rest = total - start;
            let room = self.remaining();
            split = if rest * spacing <= room {
                Split {
                    lines: rest,
                    marker: false,
                }
            } else {
                self.split_point(item, rest, room, true)
                    .unwrap_or(Split { lines: 1, marker: false })
            };
        }

        if !self.followers_ok(index, self.remaining()) {
            self.warn(
                WarningKind::UnpreventableOrphan,
                index,
                format!("split {} cannot be kept with what follows", item.kind()),
            );
        }
        self.break_pending = item.element.breaks_after();
    }

    /// The element carries MORE/CONT'D markers when split
    pub(crate) fn continues_speech(&self, item: &Measured<'_>) -> bool {
        self.config.continuation.enabled
            && item.kind() == ElementType::Dialogue
            && item.element.character_name.is_some()
            && self.capacity() >= item.style.line_spacing + 2
    }

    /// Split minimums, dialogue combined with the orphan settings
    fn split_minimums(&self, item: &Measured<'_>) -> (u32, u32) {
        let (mut before, mut after) = (item.style.min_before, item.style.min_after);
        if item.kind() == ElementType::Dialogue {
            before = before.max(self.config.orphan.dialogue_min_before_split);
            after = after.max(self.config.orphan.dialogue_min_after_split);
        }
        (before.max(1), after.max(1))
    }

    /// How many of `rest` remaining lines go into `room` page rows.
    ///
    /// Returns `None` when no split honors the minimums. With `forced` the
    /// minimums are relaxed instead, so the caller always makes progress.
    pub(crate) fn split_point(
        &self,
        item: &Measured<'_>,
        rest: u32,
        room: u32,
        forced: bool,
    ) -> Option<Split> {
        let spacing = item.style.line_spacing;
        let marker = self.continues_speech(item);
        let reserve = u32::from(marker);
        let fit = room.saturating_sub(reserve) / spacing;
        let (min_before, min_after) = self.split_minimums(item);

        let before = fit.min(rest.saturating_sub(min_after));
        if before >= min_before && before < rest && rest - before >= min_after {
            return Some(Split {
                lines: before,
                marker,
            });
        }
        if !forced {
            return None;
        }
        if fit == 0 {
            return Some(Split {
                lines: (room / spacing).clamp(1, rest),
                marker: false,
            });
        }
        Some(Split {
            lines: fit.min(rest),
            marker,
        })
    }

    /// Keep-with-next, scene heading and character cue rules for the element
    /// at `index`, given `room` rows left below it.
    pub(crate) fn followers_ok(&self, index: usize, room: u32) -> bool {
        let item = &self.items[index];
        let next = index + 1;
        if item.element.breaks_after() || next >= self.items.len() {
            return true;
        }
        if self.items[next].style.new_page_before {
            return true;
        }

        let mut keep = item.style.keep_with_next_lines;
        if item.kind() == ElementType::SceneHeading {
            keep = keep.max(self.config.orphan.scene_heading_min_following);
        }
        if keep > 0 {
            let want = keep.min(self.block_lines(next));
            if want > 0 && self.placeable(next, room) < want {
                return false;
            }
        }

        if item.kind() == ElementType::Character {
            let want = self
                .config
                .orphan
                .character_min_dialogue_lines
                .min(self.speech_lines(next));
            if want > 0 && self.speech_placeable(next, room) < want {
                return false;
            }
        }
        true
    }

    /// Text lines of the element at `index`, or of the tallest column when
    /// it opens a dual-dialogue run
    fn block_lines(&self, index: usize) -> u32 {
        if self.items[index].element.dual_side().is_some() {
            let (left, right) = self.dual_columns(index..self.dual_run_end(index));
            let lines = |col: &[usize]| col.iter().map(|&k| self.items[k].lines()).sum::<u32>();
            lines(&left[..]).max(lines(&right[..]))
        } else {
            self.items[index].lines()
        }
    }

    /// Lines of the element at `index` that would land in `room` rows
    pub(crate) fn placeable(&self, index: usize, room: u32) -> u32 {
        let item = &self.items[index];
        if item.element.dual_side().is_some() {
            let range = index..self.dual_run_end(index);
            let (height, space_before) = self.dual_height(range);
            return if space_before + height <= room {
                self.block_lines(index)
            } else {
                0
            };
        }
        let placed = self.placeable_single(index, room);
        // A whole element stays only if its own followers fit below it
        if placed > 0 && placed == item.lines() {
            let after = room
                .saturating_sub(item.style.space_before + item.rows())
                .saturating_sub(item.style.space_after);
            if !self.followers_ok(index, after) {
                return 0;
            }
        }
        placed
    }

    fn placeable_single(&self, index: usize, room: u32) -> u32 {
        let item = &self.items[index];
        if item.kind() == ElementType::PageBreak || item.style.new_page_before {
            return 0;
        }
        if item.style.space_before + item.rows() <= room {
            return item.lines();
        }
        if !item.style.can_split {
            return 0;
        }
        let room = room.saturating_sub(item.style.space_before);
        self.split_point(item, item.lines(), room, false)
            .map_or(0, |split| split.lines)
    }

    fn speech_indices(&self, start: usize) -> Range<usize> {
        let mut end = start;
        while end < self.items.len() {
            let item = &self.items[end];
            if !item.kind().is_speech() || item.element.dual_side().is_some() {
                break;
            }
            end += 1;
            if item.element.breaks_after() {
                break;
            }
        }
        start..end
    }

    /// Text lines of the parenthetical/dialogue block starting at `start`
    fn speech_lines(&self, start: usize) -> u32 {
        self.speech_indices(start)
            .map(|k| self.items[k].lines())
            .sum()
    }

    /// Lines of the speech block starting at `start` that fit in `room`
    fn speech_placeable(&self, start: usize, mut room: u32) -> u32 {
        let mut placed = 0;
        for k in self.speech_indices(start) {
            let item = &self.items[k];
            let lines = self.placeable_single(k, room);
            if lines < item.lines() {
                placed += lines;
                break;
            }
            room = room
                .saturating_sub(item.style.space_before + item.rows())
                .saturating_sub(item.style.space_after);
            // a parenthetical left behind by its dialogue moves with it
            if !self.followers_ok(k, room) {
                break;
            }
            placed += lines;
        }
        placed
    }
}
