//! Viewport controller: visible row count and scroll offset.
//!
//! The controller never measures anything itself. It is a two-phase state
//! machine driven by the layout pass:
//! * `invalidate()` after segments change marks the frame as awaiting
//!   measurement; the previous scroll offset stays in effect meanwhile.
//! * `on_measured()` receives the content and marker heights and converges the
//!   scroll offset in one step (no easing).
//!
//! Invariants after every call:
//! * `visible_rows() >= 1`.
//! * The cursor row (`marker_height`, 1-indexed) of the last measurement lies in
//!   `[scroll_offset, scroll_offset + visible_rows]` once measured.

use core_events::Measurement;
use std::ops::Range;
use tracing::debug;

/// `max(rows ?? max_rows ?? 1, min(max_rows ?? rows ?? 1, content_height))`, floored at 1.
pub fn visible_row_count(
    rows: Option<usize>,
    max_rows: Option<usize>,
    content_height: usize,
) -> usize {
    let lower = rows.or(max_rows).unwrap_or(1);
    let upper = max_rows.or(rows).unwrap_or(1);
    lower.max(upper.min(content_height)).max(1)
}

/// Scroll offset that keeps the cursor row visible.
pub fn next_scroll_offset(
    scroll_offset: usize,
    visible_rows: usize,
    content_height: usize,
    marker_height: usize,
) -> usize {
    let cursor_line_end = marker_height;
    if cursor_line_end <= scroll_offset {
        cursor_line_end.saturating_sub(1)
    } else if cursor_line_end > scroll_offset + visible_rows {
        cursor_line_end - visible_rows
    } else if content_height < visible_rows {
        0
    } else if content_height < scroll_offset + visible_rows {
        content_height - visible_rows
    } else {
        scroll_offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollChange {
    Unchanged,
    Scrolled { from: usize, to: usize },
    /// Visible row count changed but the offset did not.
    Resized,
}

impl ScrollChange {
    pub fn needs_repaint(&self) -> bool {
        !matches!(self, ScrollChange::Unchanged)
    }
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    rows: Option<usize>,
    max_rows: Option<usize>,
    scroll_offset: usize,
    visible_rows: usize,
    last: Option<Measurement>,
    needs_measurement: bool,
}

impl ViewportController {
    pub fn new(rows: Option<usize>, max_rows: Option<usize>) -> Self {
        Self {
            rows,
            max_rows,
            scroll_offset: 0,
            visible_rows: visible_row_count(rows, max_rows, 0),
            last: None,
            needs_measurement: true,
        }
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Row range to paint: `[scroll_offset, scroll_offset + visible_rows)`.
    pub fn window(&self) -> Range<usize> {
        self.scroll_offset..self.scroll_offset + self.visible_rows
    }

    pub fn needs_measurement(&self) -> bool {
        self.needs_measurement
    }

    /// Segments changed; a new measurement is expected.
    pub fn invalidate(&mut self) {
        self.needs_measurement = true;
    }

    /// Feed measured heights. Identical consecutive measurements are ignored.
    pub fn on_measured(&mut self, measurement: Measurement) -> ScrollChange {
        self.needs_measurement = false;
        if self.last == Some(measurement) {
            return ScrollChange::Unchanged;
        }
        self.last = Some(measurement);
        self.recompute(measurement)
    }

    fn recompute(&mut self, m: Measurement) -> ScrollChange {
        let prev_visible = self.visible_rows;
        let prev_offset = self.scroll_offset;
        self.visible_rows = visible_row_count(self.rows, self.max_rows, m.content_height);
        self.scroll_offset = next_scroll_offset(
            prev_offset,
            self.visible_rows,
            m.content_height,
            m.marker_height,
        );
        let change = if self.scroll_offset != prev_offset {
            ScrollChange::Scrolled {
                from: prev_offset,
                to: self.scroll_offset,
            }
        } else if self.visible_rows != prev_visible {
            ScrollChange::Resized
        } else {
            ScrollChange::Unchanged
        };
        if change.needs_repaint() {
            debug!(
                target: "render.viewport",
                content_height = m.content_height,
                marker_height = m.marker_height,
                visible_rows = self.visible_rows,
                scroll_offset = self.scroll_offset,
                "viewport_recomputed"
            );
        }
        change
    }
}
