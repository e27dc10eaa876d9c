//! Segment kind → terminal style.
//!
//! Styles are caller-supplied `ContentStyle` values passed through untouched;
//! the only attributes added here are dim (placeholder) and reverse (cursor).
//! Reverse is applied only while the cursor is both shown and focused.

use crate::segment::SegmentKind;
use crossterm::style::{Attribute, ContentStyle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleSet {
    pub text: ContentStyle,
    pub highlight: Option<ContentStyle>,
}

impl StyleSet {
    pub fn new(text: ContentStyle, highlight: Option<ContentStyle>) -> Self {
        Self { text, highlight }
    }

    fn highlight_or_text(&self) -> ContentStyle {
        self.highlight.unwrap_or(self.text)
    }
}

pub fn resolve_style(
    kind: SegmentKind,
    styles: &StyleSet,
    show_cursor: bool,
    focus: bool,
) -> ContentStyle {
    match kind {
        SegmentKind::Plain => styles.text,
        SegmentKind::Placeholder => {
            let mut style = styles.text;
            style.attributes.set(Attribute::Dim);
            style
        }
        SegmentKind::Highlight => styles.highlight_or_text(),
        SegmentKind::Cursor => {
            let mut style = styles.highlight_or_text();
            if show_cursor && focus {
                style.attributes.set(Attribute::Reverse);
            }
            style
        }
    }
}
