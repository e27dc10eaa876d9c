//! Core event types shared by the input task, the edit engine and the runtime loop.

use std::fmt;
use std::sync::atomic::AtomicU64;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// The runtime uses a bounded mpsc channel sized by `EVENT_CHANNEL_CAP`. The input task awaits
// `send` (backpressure) rather than dropping keys; measurement results flow back through the same
// channel so a slow layout pass never reorders edits.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

// Telemetry counters (relaxed fetch_add). Inspected by tests and logged at shutdown.
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static KEYPRESS_TOTAL: AtomicU64 = AtomicU64::new(0);
pub static PASTE_SESSIONS: AtomicU64 = AtomicU64::new(0);
pub static PASTE_CHARS: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STARTS: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_SIGNAL: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_CHANNEL: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_STREAM: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_ERROR: AtomicU64 = AtomicU64::new(0);

/// Top-level event enum consumed by the runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    /// Row counts reported by the layout pass after a render was committed.
    Measured(Measurement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyInput),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
    FocusGained,
    FocusLost,
}

/// Heights reported back by whatever lays the segments out.
///
/// `content_height` is the row count of the full segment sequence;
/// `marker_height` the row count of the prefix ending at the cursor, i.e. the
/// 1-indexed row the cursor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    pub content_height: usize,
    pub marker_height: usize,
}

impl Measurement {
    pub fn new(content_height: usize, marker_height: usize) -> Self {
        Self {
            content_height,
            marker_height,
        }
    }
}

/// Logical key identity. Terminal escape decoding happens upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    /// Text payload without key identity (bracketed paste, IME commit).
    Paste,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

/// Decoded key press plus the raw text it produced.
///
/// `text` is empty for pure control keys and holds one or more chars for typed
/// or pasted input. Consumers must not log it; log `text_len()` instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub code: KeyCode,
    pub mods: KeyModifiers,
    pub text: String,
}

impl KeyInput {
    /// Control key with no text payload.
    pub fn key(code: KeyCode, mods: KeyModifiers) -> Self {
        Self {
            code,
            mods,
            text: String::new(),
        }
    }

    /// Printable character without modifiers.
    pub fn char(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            mods: KeyModifiers::empty(),
            text: c.to_string(),
        }
    }

    /// Multi-char payload delivered in one event.
    pub fn paste(text: impl Into<String>) -> Self {
        Self {
            code: KeyCode::Paste,
            mods: KeyModifiers::empty(),
            text: text.into(),
        }
    }

    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_return(&self) -> bool {
        self.code == KeyCode::Enter
    }
    pub fn is_tab(&self) -> bool {
        matches!(self.code, KeyCode::Tab | KeyCode::BackTab)
    }
    pub fn is_shift(&self) -> bool {
        self.mods.contains(KeyModifiers::SHIFT) || self.code == KeyCode::BackTab
    }
    pub fn is_ctrl(&self) -> bool {
        self.mods.contains(KeyModifiers::CTRL)
    }
    pub fn is_up(&self) -> bool {
        self.code == KeyCode::Up
    }
    pub fn is_down(&self) -> bool {
        self.code == KeyCode::Down
    }
    pub fn is_left(&self) -> bool {
        self.code == KeyCode::Left
    }
    pub fn is_right(&self) -> bool {
        self.code == KeyCode::Right
    }
    pub fn is_backspace(&self) -> bool {
        self.code == KeyCode::Backspace
    }
    pub fn is_delete(&self) -> bool {
        self.code == KeyCode::Delete
    }
    /// Ctrl+C, matched case-insensitively on the base char.
    pub fn is_ctrl_c(&self) -> bool {
        self.is_ctrl() && matches!(self.code, KeyCode::Char('c' | 'C'))
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}+{}", self.code, self.mods, self.text_len())
    }
}
