//! KPI dashboard: agents table, human-vs-AI histogram, commentary

use agent_optimizer_sdk::{AnalysisResult, KpiReport};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::render_placeholder;
use crate::app::App;
use crate::dialogue::{RequestStatus, Settlement};
use crate::histogram::{Histogram, RowGeometry, FIXED_MAX_WIDTH};
use crate::utils::format_number;

const LABEL_WIDTH: usize = 22;
/// Room after the bar for its caption
const CAPTION_WIDTH: u16 = 24;

pub fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let dialogue = app.session.dialogue();
    let result = match dialogue.report() {
        KpiReport::Ready(result) => result,
        KpiReport::Empty => {
            let message = match dialogue.status() {
                RequestStatus::Idle => "Answer all five questions to generate the analysis",
                RequestStatus::InFlight => "Generating deck...",
                RequestStatus::Settled(Settlement::Success) => {
                    "The service returned no KPI values"
                }
                RequestStatus::Settled(Settlement::Failure(_)) => {
                    "The analysis failed; press Ctrl+R to start over"
                }
            };
            render_placeholder(f, area, "KPI Dashboard", message);
            return;
        }
    };

    let hover_lines = if app.histogram.hovered().is_some() { 2 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(table_height(result.agents.len())),
            Constraint::Length(3 * 3 + hover_lines + 2),
            Constraint::Min(0),
        ])
        .split(area);

    render_agents(f, chunks[0], result);
    render_histogram(f, chunks[1], &app.histogram);
    render_commentary(f, chunks[2], result, dialogue.artifact());
}

fn render_agents(f: &mut Frame, area: Rect, result: &AnalysisResult) {
    let header = Row::new(vec!["Agent", "Latency (hr)", "Cost (USD)", "Score", "Dev Time (hr)"])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let rows: Vec<Row> = result
        .agents
        .iter()
        .map(|agent| {
            Row::new(vec![
                agent.name.clone(),
                format_number(agent.latency_hours),
                format!("${}", format_number(agent.cost_usd)),
                format_number(agent.score),
                format_number(agent.dev_time_hours),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(32),
            Constraint::Percentage(17),
            Constraint::Percentage(17),
            Constraint::Percentage(17),
            Constraint::Percentage(17),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(" Agents "));

    f.render_widget(table, area);
}

/// Agents table rows plus header and borders
fn table_height(agents: usize) -> u16 {
    u16::try_from(agents).unwrap_or(u16::MAX).saturating_add(3)
}

/// Scale a bar from histogram units to terminal cells
fn cells(width: f64, bar_area: u16) -> usize {
    ((width / FIXED_MAX_WIDTH) * bar_area as f64).round() as usize
}

fn histogram_lines(histogram: &Histogram, bar_area: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for row in histogram.rows() {
        let RowGeometry {
            kpi,
            human_bar,
            ai_bar,
            difference,
            detail,
            ..
        } = row;
        let values = histogram.values(kpi);

        // Detail panel sits above the bars
        if let Some(panel) = detail {
            let style = Style::default().fg(Color::Black).bg(Color::Yellow);
            let pad = " ".repeat(LABEL_WIDTH);
            lines.push(Line::from(vec![
                Span::raw(pad.clone()),
                Span::styled(format!(" {} ", panel.human_line), style),
            ]));
            lines.push(Line::from(vec![
                Span::raw(pad),
                Span::styled(format!(" {} ", panel.ai_line), style),
            ]));
        }

        let label_style = if histogram.hovered() == Some(kpi) {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let marker = if histogram.hovered() == Some(kpi) { "▶ " } else { "  " };

        lines.push(Line::from(vec![
            Span::styled(
                format!("{}{:<width$}", marker, kpi.label(), width = LABEL_WIDTH - 2),
                label_style,
            ),
            Span::styled(
                "█".repeat(cells(human_bar.width, bar_area)),
                Style::default().fg(Color::Red),
            ),
            Span::raw(format!(" Human {}", format_number(values.human))),
        ]));
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(LABEL_WIDTH)),
            Span::styled(
                "█".repeat(cells(ai_bar.width, bar_area)),
                Style::default().fg(Color::Green),
            ),
            Span::raw(format!(" AI {}", format_number(values.ai))),
        ]));
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(LABEL_WIDTH)),
            Span::styled(
                format!("difference {} {}", difference, kpi.unit()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    lines
}

fn render_histogram(f: &mut Frame, area: Rect, histogram: &Histogram) {
    let bar_area = area
        .width
        .saturating_sub(2 + LABEL_WIDTH as u16 + CAPTION_WIDTH)
        .max(1);
    let paragraph = Paragraph::new(histogram_lines(histogram, bar_area)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Human vs AI "),
    );
    f.render_widget(paragraph, area);
}

fn render_commentary(f: &mut Frame, area: Rect, result: &AnalysisResult, artifact: Option<&str>) {
    let mut lines = Vec::new();

    if !result.commentary.is_empty() {
        lines.push(Line::from(Span::styled(
            "Commentary",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(result.commentary.clone()));
        lines.push(Line::from(""));
    }

    if !result.insights.is_empty() {
        lines.push(Line::from(Span::styled(
            "Insights",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for insight in &result.insights {
            lines.push(Line::from(format!("• {}", insight)));
        }
        lines.push(Line::from(""));
    }

    lines.push(match artifact {
        Some(name) => Line::from(vec![
            Span::styled("[D]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" Download deck ({})", name)),
        ]),
        None => Line::from(Span::styled(
            "No deck was generated",
            Style::default().fg(Color::DarkGray),
        )),
    });

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Summary "))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
