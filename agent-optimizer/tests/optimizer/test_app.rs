//! App state driven through key events

use std::sync::Arc;

use super::common::*;
use agent_optimizer::app::{App, GraphSource, View};
use agent_optimizer::histogram::Kpi;
use agent_optimizer_sdk::{ChatRole, NodeRole};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::runtime::Runtime;

fn app_with(backend: Arc<MockBackend>) -> App {
    let out = std::env::temp_dir();
    App::with_backend(
        test_config("http://127.0.0.1:5007", &out),
        backend,
        Runtime::new().unwrap(),
    )
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn ctrl(app: &mut App, c: char) {
    app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
}

fn type_line(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
    press(app, KeyCode::Enter);
}

fn answer_and_settle(app: &mut App) {
    for answer in FIVE_ANSWERS {
        type_line(app, answer);
    }
    assert!(wait_until(|| {
        app.tick();
        !app.session.dialogue().is_in_flight()
    }));
}

#[test]
fn test_typing_answers_runs_the_analysis() {
    let backend = Arc::new(MockBackend::new(sample_deck_response(2)));
    let mut app = app_with(backend.clone());

    answer_and_settle(&mut app);

    assert_eq!(backend.deck_call_count(), 1);
    assert!(app.input_buffer.is_empty());
    assert_eq!(app.histogram.max_value(), 1000.0);
    assert!(app.follow_up.is_some());
}

#[test]
fn test_enter_on_blank_input_is_ignored() {
    let backend = Arc::new(MockBackend::new(sample_deck_response(1)));
    let mut app = app_with(backend);

    type_line(&mut app, "   ");
    assert_eq!(app.session.dialogue().turn_index(), 0);
    assert_eq!(app.session.dialogue().transcript().len(), 1);
}

#[test]
fn test_tab_cycles_views() {
    let backend = Arc::new(MockBackend::new(sample_deck_response(1)));
    let mut app = app_with(backend);

    let mut seen = vec![app.current_view];
    for _ in 0..4 {
        press(&mut app, KeyCode::Tab);
        seen.push(app.current_view);
    }
    assert_eq!(
        seen,
        vec![
            View::Dialogue,
            View::FollowUp,
            View::Dashboard,
            View::Graph,
            View::Dialogue
        ]
    );
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.current_view, View::Graph);
}

#[test]
fn test_dashboard_keys_drive_hover() {
    let backend = Arc::new(MockBackend::new(sample_deck_response(2)));
    let mut app = app_with(backend);
    answer_and_settle(&mut app);
    app.current_view = View::Dashboard;

    press(&mut app, KeyCode::Down);
    assert_eq!(app.histogram.hovered(), Some(Kpi::AnalysisTime));
    press(&mut app, KeyCode::Down);
    assert_eq!(app.histogram.hovered(), Some(Kpi::DevTime));
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.histogram.hovered(), None);
}

#[test]
fn test_graph_toggle_switches_source() {
    let backend = Arc::new(MockBackend::new(sample_deck_response(2)));
    let mut app = app_with(backend);
    answer_and_settle(&mut app);
    app.current_view = View::Graph;

    assert_eq!(app.graph_source, GraphSource::Answers);
    assert!(app
        .current_graph()
        .nodes
        .iter()
        .any(|n| n.role == NodeRole::Answer));

    press(&mut app, KeyCode::Char('g'));
    assert_eq!(app.graph_source, GraphSource::Analysis);
    assert_eq!(app.current_graph().nodes.len(), 9);
}

#[test]
fn test_follow_up_chat_round_trip() {
    let backend = Arc::new(MockBackend::new(sample_deck_response(2)));
    let mut app = app_with(backend.clone());
    answer_and_settle(&mut app);
    app.current_view = View::FollowUp;

    // Blank send does nothing
    press(&mut app, KeyCode::Enter);
    assert!(backend.chat_calls.lock().unwrap().is_empty());

    type_line(&mut app, "Which agent is cheapest?");
    assert!(app.follow_up.as_ref().unwrap().waiting_for_response);

    // A second send while waiting is ignored
    type_line(&mut app, "hello?");

    assert!(wait_until(|| {
        app.tick();
        !app.follow_up.as_ref().unwrap().waiting_for_response
    }));

    let calls = backend.chat_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let request = &calls[0];
    assert_eq!(request.kpi, sample_kpi_values(2));
    assert!(request.context.contains("Tech"));
    assert_eq!(request.messages[0].role, ChatRole::System);
    assert_eq!(
        request.messages.last().map(|m| m.content.as_str()),
        Some("Which agent is cheapest?")
    );

    let chat = app.follow_up.as_ref().unwrap();
    let last = chat.messages.last().unwrap();
    assert_eq!(last.role, ChatRole::Assistant);
    assert_eq!(last.content, "Start with ticket triage.");
    assert!(chat.error.is_none());
}

#[test]
fn test_follow_up_error_is_not_a_message() {
    let mut mock = MockBackend::new(sample_deck_response(1));
    mock.chat_reply = Err(agent_optimizer_sdk::TransportError::Api {
        status: 500,
        message: "Failed to get reply".to_string(),
    });
    let mut app = app_with(Arc::new(mock));
    answer_and_settle(&mut app);
    app.current_view = View::FollowUp;

    let before = app.follow_up.as_ref().unwrap().messages.len();
    type_line(&mut app, "why?");
    assert!(wait_until(|| {
        app.tick();
        !app.follow_up.as_ref().unwrap().waiting_for_response
    }));

    let chat = app.follow_up.as_ref().unwrap();
    assert_eq!(chat.messages.len(), before + 1);
    assert_eq!(chat.error.as_deref(), Some("Failed to get reply"));
}

#[test]
fn test_ctrl_r_restarts_everything() {
    let backend = Arc::new(MockBackend::new(sample_deck_response(2)));
    let mut app = app_with(backend);
    answer_and_settle(&mut app);
    app.current_view = View::Dashboard;
    press(&mut app, KeyCode::Down);

    ctrl(&mut app, 'r');

    assert_eq!(app.current_view, View::Dialogue);
    assert!(app.follow_up.is_none());
    assert_eq!(app.histogram.hovered(), None);
    assert_eq!(app.histogram.max_value(), 1.0);
    assert_eq!(app.session.dialogue().turn_index(), 0);
    assert!(app.session.dialogue().report().is_empty());
}

#[test]
fn test_ctrl_q_quits_from_text_views() {
    let backend = Arc::new(MockBackend::new(sample_deck_response(1)));
    let mut app = app_with(backend);

    press(&mut app, KeyCode::Char('q'));
    assert!(!app.should_quit);
    assert_eq!(app.input_buffer, "q");

    ctrl(&mut app, 'q');
    assert!(app.should_quit);
}

#[test]
fn test_typing_after_completion_points_to_restart() {
    let backend = Arc::new(MockBackend::new(sample_deck_response(1)));
    let mut app = app_with(backend.clone());
    answer_and_settle(&mut app);
    let transcript_len = app.session.dialogue().transcript().len();

    type_line(&mut app, "one more thing");

    assert_eq!(app.input_buffer, "one more thing");
    assert_eq!(app.session.dialogue().transcript().len(), transcript_len);
    assert_eq!(backend.deck_call_count(), 1);
    assert!(app
        .notifications
        .get_active()
        .iter()
        .any(|n| n.title == "Dialogue complete"));
}

#[test]
fn test_blank_enter_after_completion_stays_quiet() {
    let backend = Arc::new(MockBackend::new(sample_deck_response(1)));
    let mut app = app_with(backend);
    answer_and_settle(&mut app);

    press(&mut app, KeyCode::Enter);
    assert!(!app
        .notifications
        .get_active()
        .iter()
        .any(|n| n.title == "Dialogue complete"));
}
