//! Segmentation, styling and viewport logic for the text area.
//!
//! Pipeline per frame:
//! 1. `segment::segment` turns (buffer, cursor, flags) into `RenderSegments`:
//!    the styled runs before the cursor, the cursor glyph, and the runs after.
//! 2. Something lays those runs out and reports two row counts back as a
//!    `Measurement`: the full content and the marker (prefix through the cursor).
//!    `layout::RowLayout` is the reference measurer used by the binary.
//! 3. `viewport::ViewportController::on_measured` re-derives the visible row
//!    count and the scroll offset that keeps the cursor row inside the window.
//! 4. `writer::Painter` prints the visible window of rows.
//!
//! Step 2 is asynchronous relative to step 1: the controller keeps its previous
//! scroll offset until a fresh measurement arrives.

pub mod layout;
pub mod segment;
pub mod style;
pub mod viewport;
pub mod writer;

pub use layout::{Row, RowLayout, measure};
pub use segment::{RenderSegments, Segment, SegmentKind, SegmentOptions, segment};
pub use style::{StyleSet, resolve_style};
pub use viewport::{ScrollChange, ViewportController, next_scroll_offset, visible_row_count};
pub use writer::Painter;
