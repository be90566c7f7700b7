use std::sync::Arc;
use std::time::Instant;

use agent_optimizer_sdk::{AnalysisBackend, ChatMessage, ChatRequest, ChatRole, TransportError};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::dialogue::DialogueController;

/// Follow-up conversation about a finished analysis
pub struct FollowUpChat {
    /// Message history, system instruction first
    pub messages: Vec<ChatMessage>,
    /// Current input buffer
    pub input_buffer: String,
    /// Question/answer lines sent as `context` with every request
    context: String,
    /// `kpi_values` as received, sent back verbatim
    kpi: Value,
    backend: Arc<dyn AnalysisBackend>,
    /// Tokio runtime handle for spawning tasks
    tokio_handle: tokio::runtime::Handle,
    /// Channel for receiving the reply from the background task
    response_rx: Option<mpsc::UnboundedReceiver<Result<String, TransportError>>>,
    /// Whether we're waiting for a reply
    pub waiting_for_response: bool,
    /// When we started waiting (for timing display)
    pub response_start_time: Option<Instant>,
    /// Current spinner frame (for animation)
    pub spinner_frame: usize,
    /// Lines scrolled up from the bottom of the history
    pub scroll: u16,
    /// Last request failure; cleared on the next send
    pub error: Option<String>,
}

impl FollowUpChat {
    /// Seed the conversation from a dialogue that has settled
    pub fn from_dialogue(
        dialogue: &DialogueController,
        backend: Arc<dyn AnalysisBackend>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Self {
        let kpi = match dialogue.kpi_raw() {
            Value::Null => json!({}),
            other => other.clone(),
        };
        Self::new(
            dialogue.to_conversation(),
            dialogue.context_summary(),
            kpi,
            backend,
            tokio_handle,
        )
    }

    pub fn new(
        messages: Vec<ChatMessage>,
        context: String,
        kpi: Value,
        backend: Arc<dyn AnalysisBackend>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Self {
        Self {
            messages,
            input_buffer: String::new(),
            context,
            kpi,
            backend,
            tokio_handle,
            response_rx: None,
            waiting_for_response: false,
            response_start_time: None,
            spinner_frame: 0,
            scroll: 0,
            error: None,
        }
    }

    /// Send the input buffer. Blank input, or a send while a reply is
    /// pending, is ignored and returns false.
    pub fn send_message(&mut self) -> bool {
        let text = self.input_buffer.trim().to_string();
        if text.is_empty() || self.waiting_for_response {
            return false;
        }

        self.input_buffer.clear();
        self.messages.push(ChatMessage::new(ChatRole::User, text));
        self.error = None;
        self.scroll = 0;
        self.waiting_for_response = true;
        self.response_start_time = Some(Instant::now());

        let request = ChatRequest {
            context: self.context.clone(),
            kpi: self.kpi.clone(),
            messages: self.messages.clone(),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        self.response_rx = Some(rx);

        let backend = self.backend.clone();
        info!(messages = request.messages.len(), "sending follow-up message");
        self.tokio_handle.spawn(async move {
            let result = backend.chat(&request).await;
            let _ = tx.send(result);
        });
        true
    }

    /// Poll for the reply from the background task (non-blocking)
    pub fn poll_response(&mut self) -> bool {
        let Some(rx) = &mut self.response_rx else {
            return false;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::error::TryRecvError::Empty) => return false,
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TransportError::Network(
                "Response channel disconnected".to_string(),
            )),
        };

        self.waiting_for_response = false;
        self.response_start_time = None;
        self.response_rx = None;

        match result {
            Ok(reply) => {
                self.messages
                    .push(ChatMessage::new(ChatRole::Assistant, reply));
            }
            Err(e) => {
                warn!(error = %e, "follow-up request failed");
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Messages shown to the user; the system instruction stays hidden
    pub fn visible_messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != ChatRole::System)
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Update spinner animation frame
    pub fn update_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % 8;
    }

    /// Get spinner character for current frame
    pub fn get_spinner_char(&self) -> char {
        const SPINNER: [char; 8] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧'];
        SPINNER[self.spinner_frame]
    }

    /// Get elapsed time since the request started
    pub fn get_elapsed_seconds(&self) -> Option<u64> {
        self.response_start_time.map(|start| start.elapsed().as_secs())
    }
}
