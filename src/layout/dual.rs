//! Dual-dialogue layout
//!
//! The two columns of a dual block are filled independently but share page
//! boundaries: every page segment of the block is as tall as its taller
//! column, and the shorter column is padded with blank lines.

use crate::layout::engine::BreakEngine;
use crate::model::{DualSide, LineRange, PageElement, WarningKind, PaginationWarning};
use smallvec::SmallVec;
use std::ops::Range;
use tracing::debug;

type Column = SmallVec<[usize; 4]>;

/// Progress through one column
struct ColumnCursor {
    side: DualSide,
    members: Column,
    /// Member currently being placed
    next: usize,
    /// Wrapped lines of that member already placed
    line: u32,
}

impl ColumnCursor {
    fn new(side: DualSide, members: Column) -> Self {
        Self {
            side,
            members,
            next: 0,
            line: 0,
        }
    }

    fn done(&self) -> bool {
        self.next >= self.members.len()
    }
}

impl<'a> BreakEngine<'a> {
    /// Element indices of the left and right column of a dual run
    pub(crate) fn dual_columns(&self, range: Range<usize>) -> (Column, Column) {
        let mut left = Column::new();
        let mut right = Column::new();
        for index in range {
            match self.items[index].element.dual_side() {
                Some(DualSide::Left) => left.push(index),
                Some(DualSide::Right) => right.push(index),
                None => {}
            }
        }
        (left, right)
    }

    /// Rows of one column, counting blank lines between its members
    fn column_rows(&self, column: &[usize]) -> u32 {
        column
            .iter()
            .enumerate()
            .map(|(k, &index)| {
                let item = &self.items[index];
                let gap = if k > 0 { item.style.space_before } else { 0 };
                gap + item.rows()
            })
            .sum()
    }

    /// Height of the block and the blank lines above it
    pub(crate) fn dual_height(&self, range: Range<usize>) -> (u32, u32) {
        let (left, right) = self.dual_columns(range);
        let height = self.column_rows(&left).max(self.column_rows(&right));
        let space_before = left
            .first()
            .into_iter()
            .chain(right.first())
            .map(|&index| self.items[index].style.space_before)
            .max()
            .unwrap_or(0);
        (height, space_before)
    }

    pub(crate) fn place_dual(&mut self, range: Range<usize>) {
        let items = self.items;
        let first = &items[range.start];
        self.open_for(first);

        let (left, right) = self.dual_columns(range.clone());
        let (left_rows, right_rows) = (self.column_rows(&left), self.column_rows(&right));
        let (height, space_before) = self.dual_height(range.clone());
        let capacity = self.capacity();

        if left_rows > capacity || right_rows > capacity {
            debug!(
                element = %first.element.id,
                left_rows,
                right_rows,
                capacity,
                "dual dialogue taller than a page"
            );
            self.warnings.push(PaginationWarning::element(
                WarningKind::DualDialogueOverflow,
                first.element.id.clone(),
                self.page_index(),
                format!(
                    "dual dialogue columns need {} and {} lines on a {}-line page",
                    left_rows, right_rows, capacity
                ),
            ));
        }

        if !self.at_top() {
            let remaining = self.remaining();
            let fits_here = space_before + height <= remaining;
            let worth_starting = height > capacity && remaining > space_before + 1;
            if !fits_here && !worth_starting {
                self.new_page();
            }
        }

        let mut cursors = [
            ColumnCursor::new(DualSide::Left, left),
            ColumnCursor::new(DualSide::Right, right),
        ];
        let mut origin = if self.at_top() {
            0
        } else {
            self.current.lines_used + space_before
        };

        loop {
            let avail = capacity.saturating_sub(origin);
            let mut used = [0u32; 2];
            let mut last = [None; 2];
            for (c, cursor) in cursors.iter_mut().enumerate() {
                let (rows, placed) = self.fill_column(cursor, origin, avail);
                used[c] = rows;
                last[c] = placed;
            }

            let segment = used[0].max(used[1]);
            for c in 0..2 {
                if let Some(position) = last[c] {
                    self.current.elements[position].pad_lines = segment - used[c];
                }
            }
            self.current.lines_used = origin + segment;

            if cursors.iter().all(ColumnCursor::done) {
                break;
            }
            self.new_page();
            origin = 0;
        }

        let space_after = cursors
            .iter()
            .filter_map(|cursor| cursor.members.last())
            .map(|&index| items[index].style.space_after)
            .max()
            .unwrap_or(0);
        self.current.lines_used = (self.current.lines_used + space_after).min(capacity);
        self.break_pending = items[range.end - 1].element.breaks_after();
    }

    /// Place as much of one column as fits in `avail` rows below `origin`.
    /// Returns the rows used and the position of the last placed element.
    fn fill_column(
        &mut self,
        cursor: &mut ColumnCursor,
        origin: u32,
        avail: u32,
    ) -> (u32, Option<usize>) {
        let items = self.items;
        let mut used = 0;
        let mut last = None;

        while let Some(&index) = cursor.members.get(cursor.next) {
            let item = &items[index];
            let gap = if cursor.line == 0 && used > 0 {
                item.style.space_before
            } else {
                0
            };
            let rest = item.lines() - cursor.line;
            let take = if rest == 0 {
                0
            } else {
                rest.min(avail.saturating_sub(used + gap) / item.style.line_spacing)
            };
            if take == 0 && rest > 0 {
                break;
            }

            let range = LineRange::new(cursor.line, cursor.line + take);
            let mut placed = PageElement::new(
                item.element.id.clone(),
                origin + used + gap,
                take * item.style.line_spacing,
            );
            placed.column = Some(cursor.side);
            placed.is_continuation = cursor.line > 0;
            placed.line_range = Some(range);
            if take < item.lines() {
                placed.text_range = item.wrapped.text_range(range);
            }
            self.current.elements.push(placed);
            last = Some(self.current.elements.len() - 1);

            used += gap + take * item.style.line_spacing;
            cursor.line += take;
            if cursor.line < item.lines() {
                break;
            }
            cursor.next += 1;
            cursor.line = 0;
        }
        (used, last)
    }
}
