use crate::app::AppState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::super::state::{InputMode, PromptKind};

pub(in crate::features::ui) fn handle_prompt_key(
    key: KeyEvent,
    app: &mut AppState,
    input_mode: &mut InputMode,
    input_buffer: &mut String,
    kind: PromptKind,
) {
    match key.code {
        KeyCode::Esc => {
            *input_mode = InputMode::Normal;
            input_buffer.clear();
        }
        KeyCode::Enter => {
            submit(app, kind, input_buffer);
            *input_mode = InputMode::Normal;
            input_buffer.clear();
        }
        KeyCode::Backspace => {
            input_buffer.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            input_buffer.push(ch);
        }
        _ => {}
    }
}

fn submit(app: &mut AppState, kind: PromptKind, input: &str) {
    if input.trim().is_empty() {
        return;
    }
    match kind {
        PromptKind::Add => {
            app.add_addresses(input);
        }
        PromptKind::Delete => {
            app.delete_addresses(input);
        }
        PromptKind::Search => {
            app.search(input);
        }
        PromptKind::Load => {
            app.load_files(input);
        }
        PromptKind::Edit => {
            app.edit_selected(input);
        }
    }
}
