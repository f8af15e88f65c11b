use crate::app::{AppState, Focus};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use super::format::{list_state, scroll_start, truncate_string};

const LEFT_COLUMN_WIDTH: u16 = 34;
// Six configuration rows, seven statistics rows, plus borders.
const CONFIG_PANE_HEIGHT: u16 = 8;
const STATS_PANE_HEIGHT: u16 = 9;

pub(in crate::features::ui) fn draw_main(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LEFT_COLUMN_WIDTH), Constraint::Min(20)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Length(CONFIG_PANE_HEIGHT),
            Constraint::Length(STATS_PANE_HEIGHT),
        ])
        .split(columns[0]);

    draw_address_list(frame, left[0], app);
    draw_configuration(frame, left[1], app);
    draw_statistics(frame, left[2], app);
    draw_outputs(frame, columns[1], app);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Blue)
    }
}

fn draw_address_list(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let probed = app.active_probe().map(|(address, _)| address);
    let items: Vec<ListItem> = app
        .addresses
        .iter()
        .enumerate()
        .map(|(idx, address)| {
            let (marker, marker_style) = if probed == Some(*address) {
                ("▶", Style::default().fg(Color::Green))
            } else {
                (" ", Style::default())
            };
            let text_style = if idx == app.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker} "), marker_style),
                Span::styled(format!("[{:02}] ", idx + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(truncate_string(&address.to_string(), 24), text_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Addresses ({}) ", app.addresses.len()))
                .borders(Borders::ALL)
                .border_style(border_style(app.focus == Focus::Addresses)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = list_state(app.selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn key_value_lines(text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|row| match row.split_once(':') {
            Some((key, value)) => Line::from(vec![
                Span::styled(format!(" {key}:"), Style::default().fg(Color::DarkGray)),
                Span::styled(value.to_string(), Style::default().fg(Color::White)),
            ]),
            None => Line::from(row.to_string()),
        })
        .collect()
}

fn draw_configuration(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let lines = app
        .selected_address()
        .and_then(|address| app.store.format_configuration(&address))
        .map(|text| key_value_lines(&text))
        .unwrap_or_else(|| vec![Line::styled(" no address", Style::default().fg(Color::DarkGray))]);

    let pane = Paragraph::new(lines).block(
        Block::default()
            .title(" Configuration ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(pane, area);
}

fn draw_statistics(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let title = match app.stats_address {
        Some(address) => format!(" Statistics [{address}] "),
        None => " Statistics ".to_string(),
    };
    let lines = app
        .stats_address
        .and_then(|address| app.store.format_statistics(&address))
        .map(|text| key_value_lines(&text))
        .unwrap_or_default();

    let pane = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(pane, area);
}

fn draw_outputs(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let height = usize::from(area.height.saturating_sub(2));
    let start = scroll_start(app.outputs.len(), height, app.output_offset);
    let lines: Vec<Line> = app
        .outputs
        .iter()
        .skip(start)
        .take(height)
        .map(|line| Line::from(line.as_str()))
        .collect();

    let mut title = app.title.clone();
    if app.output_offset > 0 {
        title.push_str(&format!("(-{}) ", app.output_offset));
    }
    let pane = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style(app.focus == Focus::Outputs)),
    );
    frame.render_widget(pane, area);
}
