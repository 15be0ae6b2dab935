//! Visible-window calculation for virtual scrolling.

use std::ops::Range;

use serde::Serialize;

// == Visible Range ==
/// Half-open index range of the rows to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Maps a scroll position to the rows that are (or are about to be) on screen.
///
/// `start` is the first row touching the top of the viewport. `end` covers
/// the rows that fit in the viewport plus one row of look-ahead, capped at
/// `item_count`. Negative offsets count as zero.
///
/// # Panics
/// Panics if `row_height` is not strictly positive.
pub fn compute_visible_range(
    scroll_offset: f64,
    viewport_height: f64,
    row_height: f64,
    item_count: usize,
) -> VisibleRange {
    assert!(
        row_height > 0.0,
        "row height must be positive, got {row_height}"
    );

    // `as usize` saturates: negatives and NaN become 0
    let start = (scroll_offset / row_height).floor() as usize;
    let visible_count = (viewport_height / row_height).ceil() as usize;
    let end = start.saturating_add(visible_count).saturating_add(1).min(item_count);

    VisibleRange {
        start: start.min(end),
        end,
    }
}
