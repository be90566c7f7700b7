//! Header and footer rendering functions

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use agent_optimizer_sdk::QUESTIONS;

use crate::app::{App, View};
use crate::dialogue::{RequestStatus, Settlement};

pub fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        "Agent Optimizer v{} - {}",
        env!("CARGO_PKG_VERSION"),
        app.current_view.title()
    );

    let mut spans = vec![Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];

    // Tabs
    spans.push(Span::raw("   "));
    for view in View::ALL {
        let style = if view == app.current_view {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", view.title()), style));
        spans.push(Span::raw(" "));
    }

    let status = match app.session.dialogue().status() {
        RequestStatus::Idle => Span::styled(
            format!(
                "Question {}/{}",
                (app.session.dialogue().turn_index() + 1).min(QUESTIONS.len()),
                QUESTIONS.len()
            ),
            Style::default().fg(Color::Gray),
        ),
        RequestStatus::InFlight => Span::styled(
            format!("{} Generating deck...", app.session.spinner_char()),
            Style::default().fg(Color::Yellow),
        ),
        RequestStatus::Settled(Settlement::Success) => {
            Span::styled("✓ Analysis ready", Style::default().fg(Color::Green))
        }
        RequestStatus::Settled(Settlement::Failure(_)) => {
            Span::styled("✗ Analysis failed", Style::default().fg(Color::Red))
        }
    };
    spans.push(Span::raw("  "));
    spans.push(status);

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default().borders(Borders::ALL).title(format!(
            " session {} ",
            app.session.started_at.format("%H:%M:%S")
        )),
    );
    f.render_widget(header, area);
}

fn key(label: &'static str) -> Span<'static> {
    Span::styled(label, Style::default().add_modifier(Modifier::BOLD))
}

pub fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = match app.current_view {
        View::Dialogue => vec![
            key("TYPE"),
            Span::raw(" to answer  "),
            key("[Enter]"),
            Span::raw(" Submit  "),
            key("[Esc]"),
            Span::raw(" Clear  "),
        ],
        View::FollowUp => vec![
            key("[↑↓]"),
            Span::raw(" Scroll  "),
            key("[Enter]"),
            Span::raw(" Send  "),
            key("[Esc]"),
            Span::raw(" Clear  "),
        ],
        View::Dashboard => vec![
            key("[↑↓/jk]"),
            Span::raw(" Select KPI  "),
            key("[Esc]"),
            Span::raw(" Collapse  "),
            key("[D]"),
            Span::raw(" Download deck  "),
            key("[Q]"),
            Span::raw(" Quit  "),
        ],
        View::Graph => vec![
            key("[G]"),
            Span::raw(" Toggle answers/analysis  "),
            key("[Q]"),
            Span::raw(" Quit  "),
        ],
    };
    spans.extend([
        key("[Tab]"),
        Span::raw(" Switch view  "),
        key("[Ctrl+R]"),
        Span::raw(" Restart  "),
        key("[Ctrl+Q]"),
        Span::raw(" Quit"),
    ]);

    let footer =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}
