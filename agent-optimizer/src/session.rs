//! One dialogue session bound to a backend.
//!
//! The [`DialogueController`] stays synchronous; this type owns the single
//! asynchronous boundary. A finalize spawns the backend call on the tokio
//! runtime and the result comes back over a channel that [`Session::poll`]
//! drains without blocking, so the event loop never waits on the network.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use agent_optimizer_sdk::{
    AnalysisBackend, AnalysisOutcome, AnalysisRequest, Ticket, TransportError,
};
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dialogue::{DialogueController, DialogueError, Phase, SubmitOutcome};
use crate::utils::{save_bytes, DECK_FILENAME};

type Settlement = (Ticket, Result<AnalysisOutcome, TransportError>);

/// Result of a background deck download
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadResult {
    Saved(PathBuf),
    Failed(String),
}

pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Local>,
    dialogue: DialogueController,
    backend: Arc<dyn AnalysisBackend>,
    tokio_handle: tokio::runtime::Handle,
    response_rx: Option<mpsc::UnboundedReceiver<Settlement>>,
    download_rx: Option<mpsc::UnboundedReceiver<DownloadResult>>,
    output_dir: PathBuf,
    /// Current spinner frame (for the in-flight indicator)
    pub spinner_frame: usize,
}

impl Session {
    pub fn new(
        dialogue: DialogueController,
        backend: Arc<dyn AnalysisBackend>,
        tokio_handle: tokio::runtime::Handle,
        output_dir: PathBuf,
    ) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, "session started");
        Self {
            id,
            started_at: Local::now(),
            dialogue,
            backend,
            tokio_handle,
            response_rx: None,
            download_rx: None,
            output_dir,
            spinner_frame: 0,
        }
    }

    pub fn dialogue(&self) -> &DialogueController {
        &self.dialogue
    }

    pub fn backend(&self) -> Arc<dyn AnalysisBackend> {
        self.backend.clone()
    }

    /// Feed one line of user input to the dialogue, sending the analysis
    /// request when it was the last answer
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        let outcome = self.dialogue.submit_answer(text);
        if let SubmitOutcome::Finalize(request) = &outcome {
            self.dispatch(request.clone());
        }
        outcome
    }

    /// Explicit finalize; rejected unless every answer is in and nothing was sent
    pub fn finalize(&mut self) -> Result<Ticket, DialogueError> {
        let request = self.dialogue.finalize()?;
        let ticket = request.ticket;
        self.dispatch(request);
        Ok(ticket)
    }

    fn dispatch(&mut self, request: AnalysisRequest) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.response_rx = Some(rx);

        let backend = self.backend.clone();
        info!(session = %self.id, ticket = request.ticket.0, "sending analysis request");
        self.tokio_handle.spawn(async move {
            let result = backend.generate_deck(&request.payload).await;
            // Receiver is gone after a reset; the result is simply dropped
            let _ = tx.send((request.ticket, result));
        });
    }

    /// Apply anything that became ready since the last call. Returns true
    /// when visible state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = self.dialogue.tick(Instant::now());

        if let Some(rx) = &mut self.response_rx {
            match rx.try_recv() {
                Ok((ticket, result)) => {
                    self.response_rx = None;
                    changed |= self.dialogue.settle(ticket, result);
                }
                Err(mpsc::error::TryRecvError::Empty) => {}
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.response_rx = None;
                    // The request task died without reporting; fail the ticket it carried
                    if let Phase::Finalizing(ticket) = *self.dialogue.phase() {
                        changed |= self.dialogue.settle(
                            ticket,
                            Err(TransportError::Network(
                                "analysis task ended unexpectedly".to_string(),
                            )),
                        );
                    }
                }
            }
        }

        changed
    }

    /// Start saving the generated deck to the output directory
    pub fn start_download(&mut self) -> Result<(), String> {
        let artifact = self
            .dialogue
            .artifact()
            .ok_or_else(|| "No deck available to download".to_string())?
            .to_string();
        if self.download_rx.is_some() {
            return Err("A download is already running".to_string());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.download_rx = Some(rx);
        let backend = self.backend.clone();
        let output_dir = self.output_dir.clone();

        info!(session = %self.id, artifact = %artifact, "downloading deck");
        self.tokio_handle.spawn(async move {
            let result = match backend.download_artifact(&artifact).await {
                Ok(bytes) => match save_bytes(&output_dir, DECK_FILENAME, &bytes).await {
                    Ok(path) => DownloadResult::Saved(path),
                    Err(e) => DownloadResult::Failed(format!("{:#}", e)),
                },
                Err(e) => DownloadResult::Failed(e.to_string()),
            };
            let _ = tx.send(result);
        });
        Ok(())
    }

    /// Non-blocking check for a finished download
    pub fn poll_download(&mut self) -> Option<DownloadResult> {
        let rx = self.download_rx.as_mut()?;
        match rx.try_recv() {
            Ok(result) => {
                self.download_rx = None;
                if let DownloadResult::Failed(e) = &result {
                    warn!(error = %e, "deck download failed");
                }
                Some(result)
            }
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.download_rx = None;
                Some(DownloadResult::Failed(
                    "Download task ended unexpectedly".to_string(),
                ))
            }
        }
    }

    pub fn is_downloading(&self) -> bool {
        self.download_rx.is_some()
    }

    /// Back to the first question; an in-flight result will be discarded
    pub fn reset(&mut self) {
        self.response_rx = None;
        self.dialogue.reset();
        self.spinner_frame = 0;
    }

    /// Update spinner animation frame
    pub fn update_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
    }

    pub fn spinner_char(&self) -> char {
        SPINNER[self.spinner_frame]
    }
}

const SPINNER: [char; 8] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧'];
