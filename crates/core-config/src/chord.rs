//! Key chord strings from the `[keys]` table.

use core_events::{KeyCode, KeyInput, KeyModifiers};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyChordParseError {
    #[error("empty key chord")]
    Empty,
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

/// A key plus the exact modifier set it must be pressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl Default for KeyChord {
    fn default() -> Self {
        Self::new(KeyCode::Enter, KeyModifiers::CTRL)
    }
}

impl KeyChord {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn matches(&self, key: &KeyInput) -> bool {
        key.code == self.code && key.mods == self.mods
    }
}

impl FromStr for KeyChord {
    type Err = KeyChordParseError;

    /// `"ctrl+enter"`, `"alt+enter"`, `"ctrl+d"`, `"enter"`. Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let mut parts: Vec<&str> = lower.split('+').map(str::trim).collect();
        let key = match parts.pop() {
            Some(k) if !k.is_empty() => k,
            _ => return Err(KeyChordParseError::Empty),
        };
        let mut mods = KeyModifiers::empty();
        for m in parts {
            mods |= match m {
                "ctrl" | "control" => KeyModifiers::CTRL,
                "alt" | "meta" | "option" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                other => return Err(KeyChordParseError::UnknownModifier(other.to_string())),
            };
        }
        let code = match key {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "space" => KeyCode::Char(' '),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(KeyChordParseError::UnknownKey(other.to_string())),
                }
            }
        };
        Ok(Self::new(code, mods))
    }
}
