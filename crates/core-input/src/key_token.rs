use crate::map_mods;
use core_events::{KeyCode, KeyInput, KeyModifiers};
use crossterm::event::{KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind};

/// Translate a crossterm key event into a `KeyInput`.
///
/// Release events and key codes the text area has no use for (function keys,
/// media keys, lock keys) yield `None`. A printable char carries itself as the
/// text payload unless Ctrl or Alt is held, so chords never insert text.
pub fn translate_key(event: &CKeyEvent) -> Option<KeyInput> {
    if matches!(event.kind, CKeyEventKind::Release) {
        return None;
    }
    let mods = map_mods(event.modifiers);
    let code = map_key_code(&event.code)?;
    let text = match code {
        KeyCode::Char(c) if !mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) => {
            c.to_string()
        }
        _ => String::new(),
    };
    Some(KeyInput { code, mods, text })
}

fn map_key_code(code: &CKeyCode) -> Option<KeyCode> {
    let code = match code {
        CKeyCode::Char(c) => KeyCode::Char(*c),
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::Tab => KeyCode::Tab,
        CKeyCode::BackTab => KeyCode::BackTab,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        _ => return None,
    };
    Some(code)
}
