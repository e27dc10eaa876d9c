//! Cursor movement.
//!
//! Vertical motion keeps the column when the target line is long enough and
//! clamps to its end otherwise. Moving past the first or last line, or past
//! either end of the buffer horizontally, leaves the cursor where it is.

use super::EditEngine;
use crate::{EditOutcome, MotionKind};
use core_text::{char_len, clamp_column, line_count, locate, to_offset};

pub(super) fn handle_motion(kind: MotionKind, value: &str, engine: &mut EditEngine) -> EditOutcome {
    let before = engine.cursor;
    let target = match kind {
        MotionKind::Up | MotionKind::Down => {
            let Some(offset) = vertical_target(value, before, kind) else {
                return EditOutcome::Ignored;
            };
            engine.last_paste_len = 0;
            offset
        }
        MotionKind::Left => before.saturating_sub(1),
        MotionKind::Right => (before + 1).min(char_len(value)),
    };
    if target == before {
        return EditOutcome::Ignored;
    }
    engine.cursor = target;
    tracing::trace!(target: "actions.edit", motion = ?kind, from = before, to = target, "motion");
    EditOutcome::Moved { cursor: target }
}

fn vertical_target(value: &str, cursor: usize, kind: MotionKind) -> Option<usize> {
    let pos = locate(value, cursor);
    let line = match kind {
        MotionKind::Up => pos.line.checked_sub(1)?,
        _ => {
            let next = pos.line + 1;
            if next >= line_count(value) {
                return None;
            }
            next
        }
    };
    let column = clamp_column(value, line, pos.column);
    Some(to_offset(value, line, column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_target_clamps_column() {
        let v = "long line\nab\nxyz";
        assert_eq!(vertical_target(v, 9, MotionKind::Down), Some(12));
        assert_eq!(vertical_target(v, 12, MotionKind::Down), Some(15));
        assert_eq!(vertical_target(v, 3, MotionKind::Up), None);
        assert_eq!(vertical_target(v, 14, MotionKind::Down), None);
    }
}
