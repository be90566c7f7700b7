//! Dialogue and follow-up chat rendering

use agent_optimizer_sdk::{ChatRole, Speaker};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::render_placeholder;
use crate::app::App;
use crate::dialogue::RequestStatus;

fn speaker_line(label: &'static str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        format!("{}: ", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn status_line(text: String, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::ITALIC),
    ))
}

/// Rows a line takes once word-wrapped to `width` columns
fn wrapped_rows(line: &Line, width: usize) -> usize {
    if width == 0 {
        return 1;
    }
    let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    let mut rows = 1;
    let mut column = 0;
    for word in text.split(' ') {
        let len = word.chars().count();
        let needed = if column == 0 { len } else { column + 1 + len };
        if needed <= width {
            column = needed;
        } else if len <= width {
            rows += 1;
            column = len;
        } else {
            // Words wider than the area are broken across rows
            if column > 0 {
                rows += 1;
            }
            rows += (len - 1) / width;
            column = len - (len - 1) / width * width;
        }
    }
    rows
}

/// Scroll offset that keeps the last wrapped rows in view, minus `back` rows
fn bottom_scroll(lines: &[Line], area: Rect, back: u16) -> u16 {
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    let rows: usize = lines.iter().map(|l| wrapped_rows(l, inner_width)).sum();
    u16::try_from(rows.saturating_sub(inner_height))
        .unwrap_or(u16::MAX)
        .saturating_sub(back)
}

fn split_messages_input(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Messages
            Constraint::Length(3), // Input box
        ])
        .split(area);
    (chunks[0], chunks[1])
}

pub fn render_dialogue(f: &mut Frame, area: Rect, app: &App) {
    let dialogue = app.session.dialogue();
    let (messages_area, input_area) = split_messages_input(area);

    let mut lines = Vec::new();
    for entry in dialogue.transcript() {
        let (label, color) = match entry.speaker {
            Speaker::User => ("You", Color::Green),
            Speaker::SystemPrompt | Speaker::Assistant => ("Assistant", Color::Cyan),
        };
        lines.push(speaker_line(label, color));
        lines.push(Line::from(entry.text.clone()));
        lines.push(Line::from(""));
    }

    if dialogue.is_in_flight() {
        lines.push(status_line(
            format!("{} Generating deck...", app.session.spinner_char()),
            Color::Yellow,
        ));
    }
    if let Some(error) = dialogue.error() {
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let scroll = bottom_scroll(&lines, messages_area, 0);
    let messages_widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Agentic AI Solution Advisor ")
                .style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(messages_widget, messages_area);

    let input_title = match dialogue.status() {
        RequestStatus::Idle => " Your answer (Enter to submit) ",
        RequestStatus::InFlight => " Waiting for the analysis... ",
        RequestStatus::Settled(_) => " Done - Ctrl+R to start over ",
    };
    let input_widget = Paragraph::new(app.input_buffer.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(input_title)
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(input_widget, input_area);
}

pub fn render_follow_up(f: &mut Frame, area: Rect, app: &App) {
    let Some(chat) = &app.follow_up else {
        render_placeholder(
            f,
            area,
            "Follow-up Chat",
            "Available once the analysis is ready",
        );
        return;
    };
    let (messages_area, input_area) = split_messages_input(area);

    let mut lines = Vec::new();
    for message in chat.visible_messages() {
        let (label, color) = match message.role {
            ChatRole::User => ("You", Color::Green),
            ChatRole::Assistant | ChatRole::System => ("Assistant", Color::Cyan),
        };
        lines.push(speaker_line(label, color));
        lines.push(Line::from(message.content.clone()));
        lines.push(Line::from(""));
    }

    if chat.waiting_for_response {
        let elapsed = chat.get_elapsed_seconds().unwrap_or(0);
        lines.push(status_line(
            format!("{} Thinking... ({}s)", chat.get_spinner_char(), elapsed),
            Color::Yellow,
        ));
    }
    if let Some(error) = &chat.error {
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let scroll = bottom_scroll(&lines, messages_area, chat.scroll);
    let messages_widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Ask about your results ")
                .style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(messages_widget, messages_area);

    let input_widget = Paragraph::new(chat.input_buffer.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Type your message (Enter to send) ")
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(input_widget, input_area);
}
