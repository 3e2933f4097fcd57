//! Key mapping from terminal events to game actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::bindings::KeyBindings;
use crate::types::GameAction;

/// Browser-style name of a terminal key, as used in the binding table
pub fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Char(c) => c.to_string(),
        _ => return None,
    };
    Some(name)
}

/// Map keyboard input to game actions.
///
/// The binding table wins; an unbound `r` restarts.
pub fn handle_key_event(key: KeyEvent, bindings: &KeyBindings) -> Option<GameAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    if let Some(action) = key_name(key.code).and_then(|name| bindings.action_for(&name)) {
        return Some(action);
    }
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Restart),
        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
