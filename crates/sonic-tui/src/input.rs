//! crossterm key events → core `Key`s.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use sonic_core::Key;

/// Translate a key press. Control/Alt combinations are not bindable.
pub fn translate(event: KeyEvent) -> Option<Key> {
    if event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        _ => return None,
    };
    Some(key)
}

/// Ctrl-C quits regardless of the key table, as raw mode swallows SIGINT.
pub fn is_interrupt(event: &KeyEvent) -> bool {
    event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c')
}
