//! Line model over a flat, LF-normalized string.
//!
//! All offsets, columns and lengths count Unicode scalar values (`char`s), not
//! bytes and not grapheme clusters. Byte indices only appear inside the slicing
//! helpers below so callers never have to reason about UTF-8 boundaries.
//!
//! Nothing here stores state: lines are re-derived from the buffer on every
//! call. Out-of-range inputs produce best-effort results (nearest valid line or
//! column) instead of panicking.

pub mod normalize;

pub use normalize::normalize;

/// A position expressed as (line index, column within that line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl LineCol {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open `[start, end)` char range over the raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightRange {
    pub start: usize,
    pub end: usize,
}

impl HighlightRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Usable only when non-empty and fully inside a buffer of `len` chars.
    pub fn is_valid_for(&self, len: usize) -> bool {
        self.start < self.end && self.end <= len
    }
}

/// Number of `char`s in `s`.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the `idx`-th char, or `s.len()` when `idx` is at or past the end.
pub fn char_to_byte(s: &str, idx: usize) -> usize {
    s.char_indices().nth(idx).map_or(s.len(), |(b, _)| b)
}

/// Slice `s` by char range `[start, end)`; bounds are clamped.
pub fn slice_chars(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let from = char_to_byte(s, start);
    let to = char_to_byte(s, end);
    &s[from..to.max(from)]
}

/// Split `(before, after)` at char offset `at` (clamped).
pub fn split_at_char(s: &str, at: usize) -> (&str, &str) {
    s.split_at(char_to_byte(s, at))
}

/// Clamp an offset into `[0, char_len(buffer)]`.
pub fn clamp_offset(buffer: &str, offset: usize) -> usize {
    offset.min(char_len(buffer))
}

/// Logical lines of a normalized buffer. An empty buffer yields one empty
/// line; a trailing `\n` yields a trailing empty line.
pub fn split_lines(buffer: &str) -> Vec<&str> {
    buffer.split('\n').collect()
}

/// Number of logical lines (always >= 1).
pub fn line_count(buffer: &str) -> usize {
    buffer.bytes().filter(|b| *b == b'\n').count() + 1
}

/// Length in chars of line `line` (0 when the index does not exist).
pub fn line_len(buffer: &str, line: usize) -> usize {
    buffer.split('\n').nth(line).map_or(0, char_len)
}

/// Clamp `column` against the length of line `line`.
pub fn clamp_column(buffer: &str, line: usize, column: usize) -> usize {
    column.min(line_len(buffer, line))
}

/// Map an absolute offset to its (line, column).
///
/// A line spans `[start, start + len]` inclusive of both ends, so an offset
/// sitting on a `\n` belongs to the line that newline terminates. Offsets past
/// the end resolve to the end of the last line.
pub fn locate(buffer: &str, offset: usize) -> LineCol {
    let mut start = 0usize;
    let mut last = LineCol::default();
    for (idx, line) in buffer.split('\n').enumerate() {
        let len = char_len(line);
        if offset <= start + len {
            return LineCol::new(idx, offset.saturating_sub(start));
        }
        last = LineCol::new(idx, len);
        start += len + 1;
    }
    last
}

/// Inverse of [`locate`]: absolute offset of `column` on line `line`.
///
/// The column is not clamped here; callers clamp with [`clamp_column`] first.
/// A line index past the end is treated as the last line.
pub fn to_offset(buffer: &str, line: usize, column: usize) -> usize {
    let lines = split_lines(buffer);
    let target = line.min(lines.len() - 1);
    let preceding: usize = lines[..target].iter().map(|l| char_len(l) + 1).sum();
    preceding + column
}
