//! Keyboard handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use agent_optimizer_sdk::QUESTIONS;

use super::{App, View};
use crate::dialogue::SubmitOutcome;

impl App {
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Global shortcuts
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('r') if ctrl => {
                self.restart();
                return;
            }
            KeyCode::Tab => {
                self.current_view = self.current_view.next();
                return;
            }
            KeyCode::BackTab => {
                self.current_view = self.current_view.previous();
                return;
            }
            _ => {}
        }

        match self.current_view {
            View::Dialogue => self.handle_dialogue_key(key),
            View::FollowUp => self.handle_follow_up_key(key),
            View::Dashboard => self.handle_dashboard_key(key),
            View::Graph => self.handle_graph_key(key),
        }
    }

    fn handle_dialogue_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Enter => {
                if !self.session.dialogue().is_accepting_answers() {
                    if !self.input_buffer.trim().is_empty() {
                        self.notifications.warning(
                            "Dialogue complete",
                            "Press Ctrl+R to start a new session",
                        );
                    }
                    return;
                }
                let outcome = self.session.submit(&self.input_buffer);
                match outcome {
                    SubmitOutcome::Ignored => {}
                    SubmitOutcome::Advanced { .. } => self.input_buffer.clear(),
                    SubmitOutcome::Finalize(request) => {
                        self.input_buffer.clear();
                        self.notifications.info(
                            "Generating deck",
                            format!(
                                "Sent {} answers (request #{})",
                                QUESTIONS.len(),
                                request.ticket.0
                            ),
                        );
                    }
                }
            }
            KeyCode::Esc => self.input_buffer.clear(),
            _ => {}
        }
    }

    fn handle_follow_up_key(&mut self, key: KeyEvent) {
        let Some(chat) = &mut self.follow_up else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => chat.input_buffer.push(c),
            KeyCode::Backspace => {
                chat.input_buffer.pop();
            }
            KeyCode::Enter => {
                chat.send_message();
            }
            KeyCode::Up => chat.scroll_up(),
            KeyCode::Down => chat.scroll_down(),
            KeyCode::Esc => chat.input_buffer.clear(),
            _ => {}
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.histogram.hover_next(),
            KeyCode::Up | KeyCode::Char('k') => self.histogram.hover_previous(),
            KeyCode::Esc => self.histogram.leave(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.start_download(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_graph_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('g') | KeyCode::Char('G') => {
                self.graph_source = self.graph_source.toggle();
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }
}
