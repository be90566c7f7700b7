//! UI rendering functions for the agent optimizer TUI
//!
//! One render function per view, plus the header, footer and notification
//! overlay shared by all of them.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, View};

mod chat_view;
mod components;
mod dashboard_view;
mod graph_view;
mod header_footer;
mod notifications;

pub use chat_view::{render_dialogue, render_follow_up};
pub use components::{centered_rect, render_placeholder};
pub use dashboard_view::render_dashboard;
pub use graph_view::render_graph;
pub use header_footer::{render_footer, render_header};
pub use notifications::render_notifications;

/// Main UI rendering function - orchestrates all view rendering
pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    match app.current_view {
        View::Dialogue => render_dialogue(f, chunks[1], app),
        View::FollowUp => render_follow_up(f, chunks[1], app),
        View::Dashboard => render_dashboard(f, chunks[1], app),
        View::Graph => render_graph(f, chunks[1], app),
    }

    render_footer(f, chunks[2], app);

    // Notification overlay
    render_notifications(f, app, chunks[1]);
}
