use crossterm::event::{KeyCode, KeyEvent};

use super::super::state::InputMode;

pub(in crate::features::ui) fn handle_help_key(key: KeyEvent, input_mode: &mut InputMode) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::F(1) => {
            *input_mode = InputMode::Normal;
        }
        _ => {}
    }
}
