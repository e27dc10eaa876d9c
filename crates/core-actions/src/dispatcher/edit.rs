//! Buffer mutation: newline / text splice and delete-before-cursor.
//!
//! Every function receives the LF-normalized value and returns the next value
//! plus cursor; nothing here keeps state beyond the engine's paste tracking.

use super::EditEngine;
use crate::{EditKind, EditOutcome};
use core_text::{char_len, char_to_byte, normalize};

pub(super) fn handle_edit(
    kind: EditKind,
    value: &str,
    text: &str,
    engine: &mut EditEngine,
) -> EditOutcome {
    let before = engine.cursor;
    match kind {
        EditKind::InsertNewline => {
            let next = splice(value, before, "\n");
            engine.cursor = before + 1;
            engine.last_paste_len = 0;
            tracing::trace!(
                target: "actions.edit",
                op = "insert_newline",
                from = before,
                to = engine.cursor,
                "edit"
            );
            EditOutcome::Changed {
                value: next,
                cursor: engine.cursor,
            }
        }
        EditKind::DeleteBefore => {
            if before == 0 {
                return EditOutcome::Ignored;
            }
            let mut next = value.to_string();
            next.remove(char_to_byte(value, before - 1));
            engine.cursor = before - 1;
            engine.last_paste_len = 0;
            tracing::trace!(
                target: "actions.edit",
                op = "delete_before",
                from = before,
                to = engine.cursor,
                "edit"
            );
            EditOutcome::Changed {
                value: next,
                cursor: engine.cursor,
            }
        }
        EditKind::InsertText => {
            let text = normalize(text);
            let len = char_len(&text);
            let next = splice(value, before, &text);
            engine.cursor = before + len;
            engine.last_paste_len = if len > 1 { len } else { 0 };
            tracing::trace!(
                target: "actions.edit",
                op = "insert_text",
                len,
                from = before,
                to = engine.cursor,
                "edit"
            );
            EditOutcome::Changed {
                value: next,
                cursor: engine.cursor,
            }
        }
    }
}

fn splice(value: &str, at: usize, text: &str) -> String {
    let byte = char_to_byte(value, at);
    let mut out = String::with_capacity(value.len() + text.len());
    out.push_str(&value[..byte]);
    out.push_str(text);
    out.push_str(&value[byte..]);
    out
}
