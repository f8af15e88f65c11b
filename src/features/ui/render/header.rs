use crate::app::AppState;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::super::state::{InputMode, PromptKind};

pub(in crate::features::ui) fn draw_header(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let (probe, probe_style) = match app.active_probe() {
        Some((address, mode)) => (
            format!(" {mode} {address} "),
            Style::default().fg(Color::Green),
        ),
        None => (" idle ".to_string(), Style::default().fg(Color::Gray)),
    };

    let mut spans = vec![
        Span::styled(
            " pingboard ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled("Addresses:", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!(" {} ", app.addresses.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("│ "),
        Span::styled("Probe:", Style::default().fg(Color::DarkGray)),
        Span::styled(probe, probe_style),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::raw("│ "));
        spans.push(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub(in crate::features::ui) fn draw_prompt(
    frame: &mut ratatui::Frame,
    area: Rect,
    kind: PromptKind,
    input: &str,
) {
    let prompt = Paragraph::new(Line::from(vec![
        Span::styled(kind.label(), Style::default().fg(Color::Yellow)),
        Span::raw(input),
        Span::styled("█", Style::default().fg(Color::Gray)),
    ]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(prompt, area);
}

pub(in crate::features::ui) fn draw_footer(
    frame: &mut ratatui::Frame,
    area: Rect,
    mode: InputMode,
) {
    let hints = match mode {
        InputMode::Normal => vec![
            ("q", "Quit"),
            ("?", "Help"),
            ("p", "Ping"),
            ("t", "Trace"),
            ("s", "Stop"),
            ("a", "Add"),
            ("d", "Delete"),
            ("f", "Find"),
            ("l", "Load"),
            ("e", "Edit"),
            ("r", "Clear"),
            ("Tab", "Focus"),
        ],
        InputMode::Prompt(_) => vec![("Enter", "Confirm"), ("Esc", "Cancel")],
        InputMode::Help => vec![("Esc", "Close")],
    };

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| {
            vec![
                Span::styled(format!(" {key} "), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{action} "), Style::default().fg(Color::Gray)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(footer, area);
}
