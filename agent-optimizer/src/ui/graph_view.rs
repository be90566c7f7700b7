//! Workflow graph drawn on a braille canvas

use agent_optimizer_sdk::{NodeRole, WorkflowGraph};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders,
    },
    Frame,
};

use super::render_placeholder;
use crate::app::{App, GraphSource};

/// Extra room around the outermost nodes, in graph units
const MARGIN_X: f64 = 120.0;
const MARGIN_Y: f64 = 80.0;

fn node_color(role: NodeRole) -> Color {
    match role {
        NodeRole::Start | NodeRole::End => Color::White,
        NodeRole::HumanStep => Color::Red,
        NodeRole::AiStep => Color::Green,
        NodeRole::Metric => Color::Blue,
        NodeRole::Answer => Color::Cyan,
        NodeRole::Aggregate => Color::Magenta,
    }
}

/// `[min, max]` of the node coordinates, padded by the margin
fn bounds(graph: &WorkflowGraph) -> ([f64; 2], [f64; 2]) {
    let (mut min_x, mut max_x) = (f64::MAX, f64::MIN);
    let (mut min_y, mut max_y) = (f64::MAX, f64::MIN);
    for node in &graph.nodes {
        min_x = min_x.min(node.position.x);
        max_x = max_x.max(node.position.x);
        min_y = min_y.min(node.position.y);
        max_y = max_y.max(node.position.y);
    }
    // Canvas y grows upward, graph y grows downward
    (
        [min_x - MARGIN_X / 4.0, max_x + MARGIN_X],
        [-max_y - MARGIN_Y, -min_y + MARGIN_Y],
    )
}

pub fn render_graph(f: &mut Frame, area: Rect, app: &App) {
    let graph = app.current_graph();
    let title = format!(" Workflow Graph: {} ", app.graph_source.label());

    if graph.is_empty() {
        let message = match app.graph_source {
            GraphSource::Answers => "Answer a question to start building the graph",
            GraphSource::Analysis => "The analysis graph appears once KPI results arrive",
        };
        render_placeholder(f, area, title.trim(), message);
        return;
    }

    let (x_bounds, y_bounds) = bounds(&graph);
    // Graph units per terminal row, for stacking multi-line labels
    let row_step = (y_bounds[1] - y_bounds[0]) / area.height.saturating_sub(2).max(1) as f64;

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for edge in &graph.edges {
                let (Some(source), Some(target)) = (graph.node(&edge.source), graph.node(&edge.target))
                else {
                    continue;
                };
                ctx.draw(&CanvasLine {
                    x1: source.position.x,
                    y1: -source.position.y,
                    x2: target.position.x,
                    y2: -target.position.y,
                    color: if edge.emphasized {
                        Color::Yellow
                    } else {
                        Color::DarkGray
                    },
                });
            }
            ctx.layer();

            for edge in &graph.edges {
                if let (Some(label), Some(source), Some(target)) = (
                    &edge.label,
                    graph.node(&edge.source),
                    graph.node(&edge.target),
                ) {
                    ctx.print(
                        (source.position.x + target.position.x) / 2.0,
                        -(source.position.y + target.position.y) / 2.0,
                        Span::styled(label.clone(), Style::default().fg(Color::Yellow)),
                    );
                }
            }

            for node in &graph.nodes {
                let style = Style::default()
                    .fg(node_color(node.role))
                    .add_modifier(Modifier::BOLD);
                for (i, text) in node.label.lines().enumerate() {
                    ctx.print(
                        node.position.x,
                        -node.position.y - i as f64 * row_step,
                        Line::from(Span::styled(format!("● {}", text), style)),
                    );
                }
            }
        });

    f.render_widget(canvas, area);
}
