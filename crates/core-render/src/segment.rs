//! Buffer → styled segment runs.
//!
//! Contract:
//! - Input: raw buffer, cursor offset (chars), and `SegmentOptions`.
//! - Output: `RenderSegments` whose concatenated text is the displayed string
//!   (mask-substituted or tab-expanded) plus the cursor glyph.
//! - Segments are rebuilt every frame; empty runs are never emitted.
//!
//! Branch priority:
//! 1. Empty buffer: placeholder (unfocused + placeholder set) or a lone cursor glyph.
//! 2. Unfocused: one plain run, no cursor, no highlight.
//! 3. Focused without a valid explicit range: the cursor's logical line is highlighted.
//! 4. Focused with a valid explicit range: the range is highlighted, sliced on the
//!    raw text and formatted per piece.
//!
//! The glyph in branch 4 is always one space even with `show_cursor == false`;
//! branch 3 uses an empty glyph in that case. Style resolution still suppresses
//! inverse video for a hidden cursor, so the space renders blank.

use core_text::{HighlightRange, char_len, normalize, slice_chars, split_at_char};

pub const CURSOR_GLYPH: &str = " ";
pub const DEFAULT_TAB_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Plain,
    Placeholder,
    Highlight,
    Cursor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn new(text: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SegmentOptions<'a> {
    pub focus: bool,
    pub show_cursor: bool,
    pub placeholder: Option<&'a str>,
    pub mask: Option<&'a str>,
    pub highlight: Option<HighlightRange>,
    pub tab_size: usize,
}

impl Default for SegmentOptions<'_> {
    fn default() -> Self {
        Self {
            focus: true,
            show_cursor: true,
            placeholder: None,
            mask: None,
            highlight: None,
            tab_size: DEFAULT_TAB_SIZE,
        }
    }
}

/// Runs split around the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderSegments {
    pub before: Vec<Segment>,
    pub cursor: Option<Segment>,
    pub after: Vec<Segment>,
}

impl RenderSegments {
    /// Full visible sequence.
    pub fn content(&self) -> impl Iterator<Item = &Segment> {
        self.before
            .iter()
            .chain(self.cursor.iter())
            .chain(self.after.iter())
    }

    /// Prefix ending with the cursor glyph; its height is the cursor row.
    pub fn marker(&self) -> impl Iterator<Item = &Segment> {
        self.before.iter().chain(self.cursor.iter())
    }

    pub fn text(&self) -> String {
        self.content().map(|s| s.text.as_str()).collect()
    }
}

/// Mask substitution or tab expansion; mask wins and is never tab-expanded.
struct Formatter<'a> {
    mask: Option<&'a str>,
    tab: String,
}

impl<'a> Formatter<'a> {
    fn new(mask: Option<&'a str>, tab_size: usize) -> Self {
        Self {
            mask: mask.filter(|m| !m.is_empty()),
            tab: " ".repeat(tab_size),
        }
    }

    fn format(&self, raw: &str) -> String {
        match self.mask {
            Some(mask) => raw
                .chars()
                .map(|c| if c == '\n' { "\n" } else { mask })
                .collect(),
            None => raw.replace('\t', &self.tab),
        }
    }
}

fn push_run(out: &mut Vec<Segment>, text: impl Into<String>, kind: SegmentKind) {
    let text = text.into();
    if !text.is_empty() {
        out.push(Segment::new(text, kind));
    }
}

/// Build the styled runs for one frame.
pub fn segment(buffer: &str, cursor: usize, opts: &SegmentOptions<'_>) -> RenderSegments {
    let buffer = normalize(buffer);
    let buffer = buffer.as_ref();
    let fmt = Formatter::new(opts.mask, opts.tab_size);

    if buffer.is_empty() {
        return match opts.placeholder {
            Some(placeholder) if !placeholder.is_empty() && !opts.focus => RenderSegments {
                before: vec![Segment::new(placeholder, SegmentKind::Placeholder)],
                ..RenderSegments::default()
            },
            _ => RenderSegments {
                cursor: Some(Segment::new(CURSOR_GLYPH, SegmentKind::Cursor)),
                ..RenderSegments::default()
            },
        };
    }

    if !opts.focus {
        return RenderSegments {
            before: vec![Segment::new(fmt.format(buffer), SegmentKind::Plain)],
            ..RenderSegments::default()
        };
    }

    let len = char_len(buffer);
    let cursor = cursor.min(len);
    let out = match opts.highlight.filter(|h| h.is_valid_for(len)) {
        Some(range) => segment_range(buffer, cursor, range, &fmt),
        None => segment_current_line(buffer, cursor, opts.show_cursor, &fmt),
    };
    tracing::trace!(
        target: "render.segment",
        before = out.before.len(),
        after = out.after.len(),
        cursor,
        "segmented"
    );
    out
}

fn segment_current_line(
    buffer: &str,
    cursor: usize,
    show_cursor: bool,
    fmt: &Formatter<'_>,
) -> RenderSegments {
    let (raw_before, raw_after) = split_at_char(buffer, cursor);
    let before = fmt.format(raw_before);
    let after = fmt.format(raw_after);
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line_end = after.find('\n').unwrap_or(after.len());

    let mut out = RenderSegments::default();
    push_run(&mut out.before, &before[..line_start], SegmentKind::Plain);
    push_run(&mut out.before, &before[line_start..], SegmentKind::Highlight);
    let glyph = if show_cursor { CURSOR_GLYPH } else { "" };
    out.cursor = Some(Segment::new(glyph, SegmentKind::Cursor));
    push_run(&mut out.after, &after[..line_end], SegmentKind::Highlight);
    push_run(&mut out.after, &after[line_end..], SegmentKind::Plain);
    out
}

fn segment_range(
    buffer: &str,
    cursor: usize,
    range: HighlightRange,
    fmt: &Formatter<'_>,
) -> RenderSegments {
    let len = char_len(buffer);
    let mut out = RenderSegments::default();
    let pieces = |lo: usize, hi: usize| {
        let clip = |x: usize| x.clamp(lo, hi);
        [
            (lo, clip(range.start), SegmentKind::Plain),
            (clip(range.start), clip(range.end), SegmentKind::Highlight),
            (clip(range.end), hi, SegmentKind::Plain),
        ]
    };
    for (start, end, kind) in pieces(0, cursor) {
        push_run(&mut out.before, fmt.format(slice_chars(buffer, start, end)), kind);
    }
    out.cursor = Some(Segment::new(CURSOR_GLYPH, SegmentKind::Cursor));
    for (start, end, kind) in pieces(cursor, len) {
        push_run(&mut out.after, fmt.format(slice_chars(buffer, start, end)), kind);
    }
    out
}
