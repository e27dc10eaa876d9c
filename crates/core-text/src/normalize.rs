//! Line-ending normalization.
//!
//! Every positional computation in the workspace runs against LF-only text.
//! `\r\n` and solitary `\r` both collapse to a single `\n`, so offsets derived
//! from normalized text never point between the two halves of a CRLF pair.

use std::borrow::Cow;

/// LF-only view of `input`, borrowing when no `\r` is present.
pub fn normalize(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
