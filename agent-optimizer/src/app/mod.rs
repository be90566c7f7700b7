//! Application state
//!
//! `App` owns the tokio runtime, the dialogue session and everything the
//! views draw. The event loop calls [`App::tick`] every iteration to pick up
//! finished background requests, then [`App::handle_key`] for input.

use std::sync::Arc;

use agent_optimizer_sdk::{AnalysisBackend, WorkflowGraph};
use anyhow::{Context, Result};
use tracing::info;

use crate::chat::FollowUpChat;
use crate::client::HttpBackend;
use crate::config::Config;
use crate::dialogue::{DialogueController, RequestStatus, Settlement};
use crate::graph_builder::{build_from_analysis, build_from_answers};
use crate::histogram::Histogram;
use crate::session::{DownloadResult, Session};

mod input;
mod models;
mod notifications;

pub use models::*;
pub use notifications::{Notification, NotificationLevel, NotificationManager};

/// Main application state
pub struct App {
    pub config: Config,
    pub session: Session,
    /// Created once the analysis has succeeded
    pub follow_up: Option<FollowUpChat>,
    pub histogram: Histogram,
    pub current_view: View,
    pub graph_source: GraphSource,
    /// Answer being typed in the dialogue view
    pub input_buffer: String,
    pub should_quit: bool,
    pub notifications: NotificationManager,

    // Tokio runtime for async operations
    pub tokio_runtime: tokio::runtime::Runtime,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let tokio_runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
        let backend = HttpBackend::new(config.clone()).context("Failed to build HTTP client")?;
        info!(base_url = %backend.base_url(), "using analysis service");

        Ok(Self::with_backend(config, Arc::new(backend), tokio_runtime))
    }

    /// Build the app around any backend implementation
    pub fn with_backend(
        config: Config,
        backend: Arc<dyn AnalysisBackend>,
        tokio_runtime: tokio::runtime::Runtime,
    ) -> Self {
        let session = Session::new(
            DialogueController::new(config.turn_delay),
            backend,
            tokio_runtime.handle().clone(),
            config.output_dir.clone(),
        );

        Self {
            config,
            session,
            follow_up: None,
            histogram: Histogram::default(),
            current_view: View::Dialogue,
            graph_source: GraphSource::default(),
            input_buffer: String::new(),
            should_quit: false,
            notifications: NotificationManager::new(),
            tokio_runtime,
        }
    }

    /// Apply everything that finished in the background since the last call
    pub fn tick(&mut self) {
        let was_in_flight = self.session.dialogue().is_in_flight();
        self.session.poll();
        if was_in_flight && !self.session.dialogue().is_in_flight() {
            self.on_analysis_settled();
        }
        if self.session.dialogue().is_in_flight() {
            self.session.update_spinner();
        }

        if let Some(chat) = &mut self.follow_up {
            chat.poll_response();
            if chat.waiting_for_response {
                chat.update_spinner();
            }
        }

        match self.session.poll_download() {
            Some(DownloadResult::Saved(path)) => {
                self.notifications
                    .success("Deck saved", path.display().to_string());
            }
            Some(DownloadResult::Failed(e)) => {
                self.notifications.error("Download failed", e);
            }
            None => {}
        }

        self.notifications.cleanup_expired();
    }

    fn on_analysis_settled(&mut self) {
        match self.session.dialogue().status() {
            RequestStatus::Settled(Settlement::Success) => {
                let dialogue = self.session.dialogue();
                self.histogram = Histogram::from_report(dialogue.report());
                self.follow_up = Some(FollowUpChat::from_dialogue(
                    dialogue,
                    self.session.backend(),
                    self.tokio_runtime.handle().clone(),
                ));

                if dialogue.report().is_empty() {
                    self.notifications
                        .warning("No KPI values", "The service returned no usable KPI data");
                } else {
                    self.notifications
                        .success("Analysis ready", "Press Tab to see the dashboard");
                }
            }
            RequestStatus::Settled(Settlement::Failure(message)) => {
                self.notifications.error("Analysis failed", message);
            }
            RequestStatus::Idle | RequestStatus::InFlight => {}
        }
    }

    /// Discard the whole session and return to the first question
    pub fn restart(&mut self) {
        self.session.reset();
        self.follow_up = None;
        self.histogram = Histogram::default();
        self.input_buffer.clear();
        self.graph_source = GraphSource::default();
        self.current_view = View::Dialogue;
        self.notifications
            .info("Restarted", "Starting over from the first question");
    }

    /// Save the generated deck in the background
    pub fn start_download(&mut self) {
        match self.session.start_download() {
            Ok(()) => {
                self.notifications.info(
                    "Downloading",
                    format!("Saving deck to {}", self.config.output_dir.display()),
                );
            }
            Err(reason) => {
                self.notifications.warning("Download", reason);
            }
        }
    }

    /// The graph currently selected for the graph view
    pub fn current_graph(&self) -> WorkflowGraph {
        let dialogue = self.session.dialogue();
        match self.graph_source {
            GraphSource::Answers => build_from_answers(dialogue.answers()),
            GraphSource::Analysis => build_from_analysis(dialogue.report()),
        }
    }
}
