//! Terminal writer + inline painter.
//!
//! The text area paints in place below the shell prompt rather than on an
//! alternate screen. Every frame returns to the area's first row (relative
//! cursor motion only), repaints exactly `visible_rows` rows, and clears
//! anything below left over from a taller previous frame.
//!
//! Design invariants:
//! * Commands preserve ordering; one flush per frame.
//! * Only relative motions are emitted so the area's origin never has to be queried.
//! * The writer owns no global state; it is a short-lived object per frame.

use crate::layout::RowLayout;
use crate::style::{StyleSet, resolve_style};
use anyhow::Result;
use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    queue,
    style::{ContentStyle, Print, PrintStyledContent, StyledContent},
    terminal::{Clear, ClearType},
};
use std::io::Write;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveToColumn(u16),
    MoveUp(u16),
    ClearLine,
    ClearBelow,
    NewLine,
    Styled(String, ContentStyle),
}

#[derive(Default, Debug)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }
    pub fn move_to_column(&mut self, x: u16) {
        self.cmds.push(Command::MoveToColumn(x));
    }
    pub fn move_up(&mut self, n: u16) {
        if n > 0 {
            self.cmds.push(Command::MoveUp(n));
        }
    }
    pub fn clear_line(&mut self) {
        self.cmds.push(Command::ClearLine);
    }
    pub fn clear_below(&mut self) {
        self.cmds.push(Command::ClearBelow);
    }
    pub fn new_line(&mut self) {
        self.cmds.push(Command::NewLine);
    }
    pub fn styled<S: Into<String>>(&mut self, s: S, style: ContentStyle) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Styled(s, style));
        }
    }
    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }
    pub fn flush_to<W: Write>(self, out: &mut W) -> Result<()> {
        for c in self.cmds {
            match c {
                Command::MoveToColumn(x) => queue!(out, MoveToColumn(x))?,
                Command::MoveUp(n) => queue!(out, MoveUp(n))?,
                Command::ClearLine => queue!(out, Clear(ClearType::CurrentLine))?,
                Command::ClearBelow => queue!(out, Clear(ClearType::FromCursorDown))?,
                Command::NewLine => queue!(out, Print("\r\n"))?,
                Command::Styled(s, style) => {
                    queue!(out, PrintStyledContent(StyledContent::new(style, s)))?
                }
            }
        }
        out.flush()?;
        Ok(())
    }
}

/// Paints the visible window of a `RowLayout`, remembering how many rows it
/// occupied so the next frame can return to the origin.
#[derive(Debug, Default)]
pub struct Painter {
    painted_rows: usize,
}

impl Painter {
    pub fn new() -> Self {
        Self { painted_rows: 0 }
    }

    pub fn painted_rows(&self) -> usize {
        self.painted_rows
    }

    /// Build the command list for one frame without writing it.
    pub fn frame(
        &mut self,
        layout: &RowLayout,
        window: Range<usize>,
        styles: &StyleSet,
        show_cursor: bool,
        focus: bool,
    ) -> Writer {
        let mut w = Writer::new();
        w.move_to_column(0);
        w.move_up(u16::try_from(self.painted_rows.saturating_sub(1)).unwrap_or(u16::MAX));
        let count = window.len();
        let rows = layout.window(window.start, count);
        for i in 0..count {
            if i > 0 {
                w.new_line();
            }
            w.clear_line();
            if let Some(row) = rows.get(i) {
                for (text, kind) in &row.runs {
                    w.styled(text.as_str(), resolve_style(*kind, styles, show_cursor, focus));
                }
            }
        }
        w.clear_below();
        self.painted_rows = count;
        w
    }

    pub fn paint<W: Write>(
        &mut self,
        out: &mut W,
        layout: &RowLayout,
        window: Range<usize>,
        styles: &StyleSet,
        show_cursor: bool,
        focus: bool,
    ) -> Result<()> {
        self.frame(layout, window, styles, show_cursor, focus)
            .flush_to(out)
    }

    /// Move below the painted area so subsequent output starts on a fresh line.
    pub fn finish<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let mut w = Writer::new();
        w.new_line();
        self.painted_rows = 0;
        w.flush_to(out)
    }
}
