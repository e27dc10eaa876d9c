//! Edit engine: key events → buffer edits and cursor motion.
//!
//! The engine owns the cursor offset and the length of the last multi-char
//! insertion; the buffer itself stays with the caller and is passed in on
//! every call. `EditEngine::handle` is the single entry point any event source
//! (terminal input task, scripted test driver) calls directly.

pub mod dispatcher;

pub use dispatcher::EditEngine;

use core_events::KeyInput;
use core_text::HighlightRange;

/// Caller-supplied key predicate for the submit / newline bindings.
pub type KeyPredicate = Box<dyn Fn(&KeyInput) -> bool + Send + Sync>;

/// Overrides for the two configurable bindings. `None` keeps the default
/// (submit: Ctrl+Enter, newline: Enter).
#[derive(Default)]
pub struct KeyBindings {
    pub submit: Option<KeyPredicate>,
    pub newline: Option<KeyPredicate>,
}

impl KeyBindings {
    pub fn with_submit(mut self, p: impl Fn(&KeyInput) -> bool + Send + Sync + 'static) -> Self {
        self.submit = Some(Box::new(p));
        self
    }

    pub fn with_newline(mut self, p: impl Fn(&KeyInput) -> bool + Send + Sync + 'static) -> Self {
        self.newline = Some(Box::new(p));
        self
    }

    pub(crate) fn is_submit(&self, key: &KeyInput) -> bool {
        match &self.submit {
            Some(p) => p(key),
            None => key.is_return() && key.is_ctrl(),
        }
    }

    pub(crate) fn is_newline(&self, key: &KeyInput) -> bool {
        match &self.newline {
            Some(p) => p(key),
            None => key.is_return(),
        }
    }
}

impl std::fmt::Debug for KeyBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyBindings")
            .field("submit", &self.submit.as_ref().map(|_| "custom"))
            .field("newline", &self.newline.as_ref().map(|_| "custom"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOptions {
    /// Inactive engines ignore every key.
    pub focus: bool,
    pub show_cursor: bool,
    pub highlight_pasted_text: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            focus: true,
            show_cursor: true,
            highlight_pasted_text: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    InsertNewline,
    /// Backspace and Delete both remove the char before the cursor.
    DeleteBefore,
    InsertText,
}

/// What a key resolves to, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Ignore,
    Motion(MotionKind),
    Edit(EditKind),
}

/// Result of handling one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The submit binding fired with the current value; nothing changed.
    Submit(String),
    /// The buffer was edited.
    Changed { value: String, cursor: usize },
    /// Only the cursor moved.
    Moved { cursor: usize },
    Ignored,
}

/// Highlight covering the last multi-char insertion ending at `cursor`.
pub fn paste_highlight(
    enabled: bool,
    cursor: usize,
    last_paste_len: usize,
) -> Option<HighlightRange> {
    (enabled && last_paste_len > 1)
        .then(|| HighlightRange::new(cursor.saturating_sub(last_paste_len), cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyCode, KeyModifiers};

    #[test]
    fn paste_highlight_requires_flag_and_length() {
        assert_eq!(paste_highlight(false, 5, 3), None);
        assert_eq!(paste_highlight(true, 5, 1), None);
        assert_eq!(paste_highlight(true, 5, 3), Some(HighlightRange::new(2, 5)));
        assert_eq!(paste_highlight(true, 2, 4), Some(HighlightRange::new(0, 2)));
    }

    #[test]
    fn default_bindings() {
        let b = KeyBindings::default();
        let enter = KeyInput::key(KeyCode::Enter, KeyModifiers::empty());
        let ctrl_enter = KeyInput::key(KeyCode::Enter, KeyModifiers::CTRL);
        assert!(b.is_submit(&ctrl_enter));
        assert!(!b.is_submit(&enter));
        assert!(b.is_newline(&enter));
    }

    #[test]
    fn custom_bindings_replace_defaults() {
        let b = KeyBindings::default()
            .with_submit(|k| k.is_return() && !k.is_shift())
            .with_newline(|k| k.is_return() && k.is_shift());
        let enter = KeyInput::key(KeyCode::Enter, KeyModifiers::empty());
        let shift_enter = KeyInput::key(KeyCode::Enter, KeyModifiers::SHIFT);
        assert!(b.is_submit(&enter));
        assert!(b.is_newline(&shift_enter));
        assert!(!b.is_newline(&enter));
        assert!(format!("{:?}", b).contains("custom"));
    }
}
