//! Terminal capability probing.
//!
//! Detection runs once at startup and records what the binary needs before it
//! touches the terminal: whether stdin/stdout are interactive (raw mode and an
//! event stream need both) and whether colour output is wanted.

use crossterm::tty::IsTty;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TerminalCapabilities {
    pub interactive: bool,
    /// False when `NO_COLOR` is set to a non-empty value.
    pub color: bool,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::from_parts(io::stdin().is_tty() && io::stdout().is_tty(), no_color)
    }

    pub fn from_parts(interactive: bool, no_color: bool) -> Self {
        Self {
            interactive,
            color: !no_color,
        }
    }
}
