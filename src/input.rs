//! Key bindings: arrows and vim-style.

use crate::game::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map a key event to the per-tick command. Arrows or hjkl; Up rotates,
/// Down is a soft drop; q/Esc quits.
pub fn key_to_command(key: KeyEvent) -> Command {
    let KeyEvent { code, modifiers, .. } = key;
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Command::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        KeyCode::Left | KeyCode::Char('h') => Command::Left,
        KeyCode::Right | KeyCode::Char('l') => Command::Right,
        KeyCode::Up | KeyCode::Char('k') => Command::Rotate,
        KeyCode::Down | KeyCode::Char('j') => Command::Down,
        _ => Command::None,
    }
}
