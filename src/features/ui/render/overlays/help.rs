use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use super::super::format::centered_rect;

const SECTIONS: [(&str, &[(&str, &str)]); 4] = [
    (
        "Navigation",
        &[
            ("Up/Down, j/k", "Select address or scroll outputs"),
            ("Tab", "Switch focus between addresses and outputs"),
            ("f, Ctrl+F", "Find an address"),
        ],
    ),
    (
        "Probing",
        &[
            ("Enter, p, Ctrl+P", "Ping selected address"),
            ("t, Ctrl+T", "Traceroute selected address"),
            ("s, Ctrl+Q", "Stop the active probe"),
            ("r, Ctrl+R", "Clear outputs"),
        ],
    ),
    (
        "Addresses",
        &[
            ("a, Ctrl+A", "Add addresses (comma separated)"),
            ("d, Ctrl+D", "Delete addresses (comma separated)"),
            ("l, Ctrl+L", "Load address list files"),
            ("e, Ctrl+E", "Edit requests/timeout/size/threshold/backup"),
        ],
    ),
    (
        "General",
        &[("?, F1", "Toggle this help"), ("q, Ctrl+C", "Quit")],
    ),
];

pub(in crate::features::ui) fn draw_help_popup(frame: &mut ratatui::Frame, area: Rect) {
    let popup_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup_area);

    let mut help_text = vec![
        Line::from(vec![Span::styled(
            "  Keyboard Shortcuts  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
    ];
    for (title, keys) in SECTIONS {
        help_text.push(Line::styled(
            format!("─── {title} ───"),
            Style::default().fg(Color::Yellow),
        ));
        for (key, action) in keys {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {key:<18}"), Style::default().fg(Color::Green)),
                Span::raw(*action),
            ]));
        }
        help_text.push(Line::from(""));
    }
    help_text.push(Line::styled(
        "  Press Esc or ? to close  ",
        Style::default().fg(Color::DarkGray),
    ));

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        )
        .style(Style::default().bg(Color::Black))
        .wrap(Wrap { trim: false });

    frame.render_widget(help, popup_area);
}
