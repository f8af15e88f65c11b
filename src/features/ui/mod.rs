mod input;
mod render;
mod state;

use crate::app::AppState;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{QueueableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use input::{handle_help_key, handle_normal_key, handle_prompt_key};
use render::{
    draw_footer, draw_header, draw_help_popup, draw_main, draw_prompt, draw_terminal_too_small,
};
use state::{InputMode, MIN_TERMINAL_HEIGHT, MIN_TERMINAL_WIDTH};

/// Runs the dashboard until the operator quits, then stops probing and
/// restores the terminal.
pub fn run_ui(mut app: AppState, refresh_hz: u16) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, refresh_hz);

    app.shutdown();
    cleanup_terminal(&mut terminal)?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut AppState,
    refresh_hz: u16,
) -> io::Result<()> {
    let mut input_mode = InputMode::Normal;
    let mut input_buffer = String::new();
    let mut should_quit = false;
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_secs_f64(1.0 / f64::from(refresh_hz.max(1)));

    while !should_quit {
        app.drain_updates();

        terminal.draw(|frame| {
            let size = frame.area();

            if size.width < MIN_TERMINAL_WIDTH || size.height < MIN_TERMINAL_HEIGHT {
                draw_terminal_too_small(frame, size);
                return;
            }

            // Header, content, optional prompt bar, footer
            let mut constraints = vec![Constraint::Length(1), Constraint::Min(10)];
            if matches!(input_mode, InputMode::Prompt(_)) {
                constraints.push(Constraint::Length(1));
            }
            constraints.push(Constraint::Length(1));

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(size);

            draw_header(frame, chunks[0], app);
            draw_main(frame, chunks[1], app);

            let footer_idx = if let InputMode::Prompt(kind) = input_mode {
                draw_prompt(frame, chunks[2], kind, &input_buffer);
                3
            } else {
                2
            };
            draw_footer(frame, chunks[footer_idx], input_mode);

            if input_mode == InputMode::Help {
                draw_help_popup(frame, size);
            }
        })?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let size = terminal.size()?;
            let too_small = size.width < MIN_TERMINAL_WIDTH || size.height < MIN_TERMINAL_HEIGHT;
            match input_mode {
                _ if too_small => should_quit = key.code == KeyCode::Char('q'),
                InputMode::Normal => {
                    should_quit =
                        handle_normal_key(key, app, &mut input_mode, &mut input_buffer);
                }
                InputMode::Help => handle_help_key(key, &mut input_mode),
                InputMode::Prompt(kind) => {
                    handle_prompt_key(key, app, &mut input_mode, &mut input_buffer, kind);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
    Ok(())
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().queue(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    terminal.backend_mut().flush()?;
    Ok(())
}
