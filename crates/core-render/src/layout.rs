//! Reference row layout used to measure and paint segment runs.
//!
//! Rows break on `\n` and soft-wrap when the next char would overflow `width`
//! terminal cells (`width == 0` disables wrapping). Each row keeps its runs
//! tagged with the originating `SegmentKind` so the painter can style them.
//! Content with no text at all measures 0 rows.

use crate::segment::{RenderSegments, Segment, SegmentKind};
use core_events::Measurement;
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub runs: Vec<(String, SegmentKind)>,
    pub width: usize,
}

impl Row {
    fn push(&mut self, c: char, w: usize, kind: SegmentKind) {
        match self.runs.last_mut() {
            Some((text, k)) if *k == kind => text.push(c),
            _ => self.runs.push((c.to_string(), kind)),
        }
        self.width += w;
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|(t, _)| t.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowLayout {
    rows: Vec<Row>,
}

impl RowLayout {
    pub fn build<'a>(segments: impl IntoIterator<Item = &'a Segment>, width: usize) -> Self {
        let mut rows: Vec<Row> = Vec::new();
        let mut current = Row::default();
        let mut any_text = false;
        for seg in segments {
            for c in seg.text.chars() {
                any_text = true;
                if c == '\n' {
                    rows.push(std::mem::take(&mut current));
                    continue;
                }
                let w = c.width().unwrap_or(0);
                if width > 0 && current.width > 0 && current.width + w > width {
                    rows.push(std::mem::take(&mut current));
                }
                current.push(c, w, seg.kind);
            }
        }
        if any_text {
            rows.push(current);
        }
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows `[start, start + count)`, clipped to what exists.
    pub fn window(&self, start: usize, count: usize) -> &[Row] {
        let from = start.min(self.rows.len());
        let to = start.saturating_add(count).min(self.rows.len());
        &self.rows[from..to]
    }
}

/// Content and marker heights for one frame at `width` columns.
pub fn measure(segments: &RenderSegments, width: usize) -> Measurement {
    Measurement::new(
        RowLayout::build(segments.content(), width).height(),
        RowLayout::build(segments.marker(), width).height(),
    )
}
