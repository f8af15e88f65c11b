use crate::app::{AppState, Focus};
use crate::config::ProbeMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::super::state::{InputMode, PromptKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Action {
    Quit,
    Help,
    Probe(ProbeMode),
    Stop,
    Prompt(PromptKind),
    ClearOutputs,
    ToggleFocus,
    Up,
    Down,
}

fn action_for(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('p') => Some(Action::Probe(ProbeMode::Ping)),
            KeyCode::Char('t') => Some(Action::Probe(ProbeMode::Traceroute)),
            KeyCode::Char('q') => Some(Action::Stop),
            KeyCode::Char('a') => Some(Action::Prompt(PromptKind::Add)),
            KeyCode::Char('d') => Some(Action::Prompt(PromptKind::Delete)),
            KeyCode::Char('f') => Some(Action::Prompt(PromptKind::Search)),
            KeyCode::Char('l') => Some(Action::Prompt(PromptKind::Load)),
            KeyCode::Char('e') => Some(Action::Prompt(PromptKind::Edit)),
            KeyCode::Char('r') => Some(Action::ClearOutputs),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::Help),
        KeyCode::Enter | KeyCode::Char('p') => Some(Action::Probe(ProbeMode::Ping)),
        KeyCode::Char('t') => Some(Action::Probe(ProbeMode::Traceroute)),
        KeyCode::Char('s') => Some(Action::Stop),
        KeyCode::Char('a') => Some(Action::Prompt(PromptKind::Add)),
        KeyCode::Char('d') => Some(Action::Prompt(PromptKind::Delete)),
        KeyCode::Char('f') => Some(Action::Prompt(PromptKind::Search)),
        KeyCode::Char('l') => Some(Action::Prompt(PromptKind::Load)),
        KeyCode::Char('e') => Some(Action::Prompt(PromptKind::Edit)),
        KeyCode::Char('r') => Some(Action::ClearOutputs),
        KeyCode::Tab => Some(Action::ToggleFocus),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
        _ => None,
    }
}

/// Returns `true` when the operator asked to quit.
pub(in crate::features::ui) fn handle_normal_key(
    key: KeyEvent,
    app: &mut AppState,
    input_mode: &mut InputMode,
    input_buffer: &mut String,
) -> bool {
    let Some(action) = action_for(key) else {
        return false;
    };
    match action {
        Action::Quit => return true,
        Action::Help => *input_mode = InputMode::Help,
        Action::Probe(mode) => app.start_probe(mode),
        Action::Stop => app.stop_probe(),
        Action::Prompt(kind) => open_prompt(app, kind, input_mode, input_buffer),
        Action::ClearOutputs => app.clear_outputs(),
        Action::ToggleFocus => app.toggle_focus(),
        Action::Up => match app.focus {
            Focus::Addresses => app.select_prev(),
            Focus::Outputs => app.scroll_outputs_up(),
        },
        Action::Down => match app.focus {
            Focus::Addresses => app.select_next(),
            Focus::Outputs => app.scroll_outputs_down(),
        },
    }
    false
}

fn open_prompt(
    app: &AppState,
    kind: PromptKind,
    input_mode: &mut InputMode,
    input_buffer: &mut String,
) {
    input_buffer.clear();
    match kind {
        PromptKind::Delete => {
            if let Some(address) = app.selected_address() {
                input_buffer.push_str(&address.to_string());
            }
        }
        PromptKind::Edit => {
            if app.selected_address().is_none() {
                return;
            }
            input_buffer.push_str(&app.edit_seed());
        }
        PromptKind::Add | PromptKind::Search | PromptKind::Load => {}
    }
    *input_mode = InputMode::Prompt(kind);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn probe_keys_have_plain_and_control_forms() {
        let ping = Some(Action::Probe(ProbeMode::Ping));
        let trace = Some(Action::Probe(ProbeMode::Traceroute));
        assert_eq!(action_for(plain(KeyCode::Enter)), ping);
        assert_eq!(action_for(plain(KeyCode::Char('p'))), ping);
        assert_eq!(action_for(ctrl('p')), ping);
        assert_eq!(action_for(plain(KeyCode::Char('t'))), trace);
        assert_eq!(action_for(ctrl('t')), trace);
    }

    #[test]
    fn control_q_stops_while_plain_q_quits() {
        assert_eq!(action_for(ctrl('q')), Some(Action::Stop));
        assert_eq!(action_for(plain(KeyCode::Char('s'))), Some(Action::Stop));
        assert_eq!(action_for(plain(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(action_for(ctrl('c')), Some(Action::Quit));
    }

    #[test]
    fn prompts_open_from_letter_keys() {
        assert_eq!(
            action_for(ctrl('f')),
            Some(Action::Prompt(PromptKind::Search))
        );
        assert_eq!(
            action_for(plain(KeyCode::Char('l'))),
            Some(Action::Prompt(PromptKind::Load))
        );
        assert_eq!(action_for(plain(KeyCode::F(1))), Some(Action::Help));
        assert_eq!(action_for(ctrl('x')), None);
    }
}
