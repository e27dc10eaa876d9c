//! Key dispatch for the edit engine.
//!
//! Resolution walks one ordered rule table; the first matching predicate wins:
//! submit > newline binding > ignored controls > vertical motion > horizontal
//! motion > fallback Enter > delete > text insert. The newline binding and the
//! fallback Enter resolve to the same `EditKind::InsertNewline`, so a custom
//! newline predicate only changes *which* keys reach it, never what it does.
//!
//! Sub-modules:
//! * `edit`   - buffer mutation (splice newline / text, delete before cursor)
//! * `motion` - cursor movement with sticky-column clamping

use crate::{Action, EditKind, EditOptions, EditOutcome, KeyBindings, MotionKind, paste_highlight};
use core_events::KeyInput;
use core_text::{HighlightRange, char_len, clamp_offset, normalize};

mod edit;
mod motion;

type Rule = (fn(&EditEngine, &KeyInput) -> bool, Action);

const RULES: [Rule; 10] = [
    (|e, k| e.bindings.is_submit(k), Action::Submit),
    (|e, k| e.bindings.is_newline(k), Action::Edit(EditKind::InsertNewline)),
    (|_, k| k.is_tab() || k.is_ctrl_c(), Action::Ignore),
    (|e, k| e.options.show_cursor && k.is_up(), Action::Motion(MotionKind::Up)),
    (|e, k| e.options.show_cursor && k.is_down(), Action::Motion(MotionKind::Down)),
    (|e, k| e.options.show_cursor && k.is_left(), Action::Motion(MotionKind::Left)),
    (|e, k| e.options.show_cursor && k.is_right(), Action::Motion(MotionKind::Right)),
    (|_, k| k.is_return(), Action::Edit(EditKind::InsertNewline)),
    (|_, k| k.is_backspace() || k.is_delete(), Action::Edit(EditKind::DeleteBefore)),
    (|_, k| !k.text.is_empty(), Action::Edit(EditKind::InsertText)),
];

#[derive(Debug)]
pub struct EditEngine {
    cursor: usize,
    last_paste_len: usize,
    options: EditOptions,
    bindings: KeyBindings,
}

impl EditEngine {
    /// Engine with the cursor placed at the end of `initial`.
    pub fn new(initial: &str, options: EditOptions, bindings: KeyBindings) -> Self {
        Self {
            cursor: char_len(&normalize(initial)),
            last_paste_len: 0,
            options,
            bindings,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_paste_len(&self) -> usize {
        self.last_paste_len
    }

    pub fn options(&self) -> EditOptions {
        self.options
    }

    pub fn set_options(&mut self, options: EditOptions) {
        self.options = options;
    }

    pub fn set_cursor(&mut self, value: &str, cursor: usize) {
        self.cursor = clamp_offset(&normalize(value), cursor);
    }

    /// Re-clamp after the caller replaced the buffer externally.
    pub fn sync_value(&mut self, value: &str) {
        self.set_cursor(value, self.cursor);
    }

    /// Explicit highlight for the segmenter, derived from paste tracking.
    pub fn highlight(&self) -> Option<HighlightRange> {
        paste_highlight(
            self.options.highlight_pasted_text,
            self.cursor,
            self.last_paste_len,
        )
    }

    /// Resolve `key` against the rule table without applying it.
    pub fn resolve(&self, key: &KeyInput) -> Option<Action> {
        RULES
            .iter()
            .find(|(pred, _)| pred(self, key))
            .map(|(_, action)| *action)
    }

    /// Handle one decoded key against the caller's current value.
    pub fn handle(&mut self, value: &str, key: &KeyInput) -> EditOutcome {
        if !self.options.focus {
            return EditOutcome::Ignored;
        }
        let Some(action) = self.resolve(key) else {
            return EditOutcome::Ignored;
        };
        if action == Action::Submit {
            tracing::debug!(target: "actions.edit", len = value.len(), "submit");
            return EditOutcome::Submit(value.to_string());
        }
        let normalized = normalize(value);
        self.cursor = clamp_offset(&normalized, self.cursor);
        match action {
            Action::Submit | Action::Ignore => EditOutcome::Ignored,
            Action::Motion(kind) => motion::handle_motion(kind, &normalized, self),
            Action::Edit(kind) => edit::handle_edit(kind, &normalized, &key.text, self),
        }
    }
}
