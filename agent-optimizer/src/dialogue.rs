//! Guided dialogue state machine.
//!
//! The controller walks the user through [`QUESTIONS`] one turn at a time and,
//! once every question is answered, hands back exactly one
//! [`AnalysisRequest`]. It performs no I/O itself: the caller sends the
//! request and reports the result through [`DialogueController::settle`].
//!
//! ```text
//! Asking(0) -> Asking(1) -> ... -> Asking(N) -> Finalizing(ticket) -> Settled(..)
//!     ^                                                                  |
//!     +----------------------------- reset ------------------------------+
//! ```

use std::time::{Duration, Instant};

use agent_optimizer_sdk::{
    AnalysisOutcome, AnalysisRequest, AnswerPayload, AnswerSet, ChatMessage, ChatRole, KpiReport,
    Speaker, Ticket, TranscriptEntry, TransportError, QUESTIONS,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Appended to the transcript when the analysis arrives
pub const CLOSING_MESSAGE: &str = "Here are your KPI results and download link!";

/// System instruction prefixed to the follow-up conversation
pub const ASSISTANT_INSTRUCTION: &str = "You are a helpful assistant.";

/// Where the dialogue currently is
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Waiting for the answer to question `i`; `Asking(N)` means all answered
    Asking(usize),
    /// The analysis request identified by the ticket is in flight
    Finalizing(Ticket),
    Settled(Settlement),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Success,
    Failure(String),
}

/// Tri-state view of the analysis request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestStatus {
    Idle,
    InFlight,
    Settled(Settlement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueTurn {
    pub index: usize,
    pub prompt: Option<&'static str>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DialogueError {
    #[error("only {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error("an analysis request is already in flight")]
    InFlight,

    #[error("the analysis has already settled; reset to start over")]
    AlreadySettled,
}

/// What a call to [`DialogueController::submit_answer`] did
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input, or the dialogue is not accepting answers
    Ignored,
    /// Answer recorded, now waiting on question `index`
    Advanced { index: usize },
    /// Last answer recorded; the caller must send this request
    Finalize(AnalysisRequest),
}

#[derive(Debug, Clone, Copy)]
struct PendingPrompt {
    index: usize,
    due: Instant,
}

pub struct DialogueController {
    phase: Phase,
    answers: AnswerSet,
    transcript: Vec<TranscriptEntry>,
    pending_prompt: Option<PendingPrompt>,
    /// Pause before the next question appears; zero shows it immediately
    turn_delay: Duration,
    next_ticket: u64,
    report: KpiReport,
    kpi_raw: Value,
    artifact: Option<String>,
    error: Option<String>,
}

impl Default for DialogueController {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl DialogueController {
    pub fn new(turn_delay: Duration) -> Self {
        Self {
            phase: Phase::Asking(0),
            answers: AnswerSet::new(),
            transcript: vec![TranscriptEntry::system(QUESTIONS[0].prompt)],
            pending_prompt: None,
            turn_delay,
            next_ticket: 1,
            report: KpiReport::Empty,
            kpi_raw: Value::Null,
            artifact: None,
            error: None,
        }
    }

    /// Record the answer to the current question.
    ///
    /// Blank input is ignored. Answering the last question finalizes the
    /// dialogue and returns the request to send.
    pub fn submit_answer(&mut self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let index = match self.phase {
            Phase::Asking(i) if i < QUESTIONS.len() => i,
            _ => {
                debug!(phase = ?self.phase, "answer ignored, dialogue is not asking");
                return SubmitOutcome::Ignored;
            }
        };

        // A question still waiting on its pacing delay is shown before the answer to it
        self.flush_pending_prompt();

        let question = &QUESTIONS[index];
        self.answers.insert(question.key, text);
        self.transcript.push(TranscriptEntry::user(text));
        self.phase = Phase::Asking(index + 1);
        info!(turn = index, key = question.key, "answer recorded");

        if index + 1 < QUESTIONS.len() {
            self.schedule_prompt(index + 1);
            return SubmitOutcome::Advanced { index: index + 1 };
        }

        match self.finalize() {
            Ok(request) => SubmitOutcome::Finalize(request),
            Err(e) => {
                warn!(error = %e, "finalize refused after last answer");
                SubmitOutcome::Ignored
            }
        }
    }

    /// Issue the analysis request. Valid once, after every question is answered.
    pub fn finalize(&mut self) -> Result<AnalysisRequest, DialogueError> {
        match self.phase {
            Phase::Asking(i) if i == QUESTIONS.len() => {}
            Phase::Asking(i) => {
                return Err(DialogueError::Incomplete {
                    answered: i,
                    total: QUESTIONS.len(),
                })
            }
            Phase::Finalizing(_) => return Err(DialogueError::InFlight),
            Phase::Settled(_) => return Err(DialogueError::AlreadySettled),
        }

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.phase = Phase::Finalizing(ticket);
        self.error = None;
        info!(ticket = ticket.0, "dialogue finalized, analysis request issued");

        Ok(AnalysisRequest {
            ticket,
            payload: AnswerPayload::from_answers(&self.answers),
        })
    }

    /// Apply the result of the request carrying `ticket`.
    ///
    /// Returns false when the ticket is not the one in flight (for example a
    /// request issued before a reset); the result is then discarded.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        result: Result<AnalysisOutcome, TransportError>,
    ) -> bool {
        match self.phase {
            Phase::Finalizing(current) if current == ticket => {}
            _ => {
                debug!(ticket = ticket.0, phase = ?self.phase, "discarding stale settlement");
                return false;
            }
        }

        match result {
            Ok(outcome) => {
                info!(
                    ticket = ticket.0,
                    empty = outcome.report.is_empty(),
                    "analysis settled"
                );
                self.report = outcome.report;
                self.kpi_raw = outcome.kpi_raw;
                self.artifact = outcome.artifact;
                self.transcript.push(TranscriptEntry::assistant(CLOSING_MESSAGE));
                self.phase = Phase::Settled(Settlement::Success);
            }
            Err(e) => {
                warn!(ticket = ticket.0, error = %e, "analysis request failed");
                let message = e.to_string();
                self.error = Some(message.clone());
                self.phase = Phase::Settled(Settlement::Failure(message));
            }
        }
        true
    }

    /// Fire the scheduled question if its delay has elapsed
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending_prompt {
            Some(pending) if pending.due <= now => {
                self.flush_pending_prompt();
                true
            }
            _ => false,
        }
    }

    /// Return to the initial state: turn 0, seeded transcript, no result
    pub fn reset(&mut self) {
        self.phase = Phase::Asking(0);
        self.answers.clear();
        self.transcript = vec![TranscriptEntry::system(QUESTIONS[0].prompt)];
        self.pending_prompt = None;
        self.report = KpiReport::Empty;
        self.kpi_raw = Value::Null;
        self.artifact = None;
        self.error = None;
        info!("dialogue reset");
    }

    /// The transcript as a chat history for the follow-up conversation
    pub fn to_conversation(&self) -> Vec<ChatMessage> {
        let opening = self
            .transcript
            .iter()
            .position(|e| e.speaker == Speaker::SystemPrompt);

        std::iter::once(ChatMessage::new(ChatRole::System, ASSISTANT_INSTRUCTION))
            .chain(
                self.transcript
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| Some(*i) != opening)
                    .map(|(_, entry)| {
                        let role = match entry.speaker {
                            Speaker::User => ChatRole::User,
                            Speaker::SystemPrompt | Speaker::Assistant => ChatRole::Assistant,
                        };
                        ChatMessage::new(role, entry.text.clone())
                    }),
            )
            .collect()
    }

    /// One "<question> <answer>" line per question, unanswered ones left blank
    pub fn context_summary(&self) -> String {
        QUESTIONS
            .iter()
            .map(|q| format!("{} {}", q.prompt, self.answers.get(q.key).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn status(&self) -> RequestStatus {
        match &self.phase {
            Phase::Asking(_) => RequestStatus::Idle,
            Phase::Finalizing(_) => RequestStatus::InFlight,
            Phase::Settled(s) => RequestStatus::Settled(s.clone()),
        }
    }

    pub fn turn(&self) -> DialogueTurn {
        let index = self.turn_index();
        DialogueTurn {
            index,
            prompt: QUESTIONS.get(index).map(|q| q.prompt),
            completed: index == QUESTIONS.len(),
        }
    }

    pub fn turn_index(&self) -> usize {
        match self.phase {
            Phase::Asking(i) => i,
            Phase::Finalizing(_) | Phase::Settled(_) => QUESTIONS.len(),
        }
    }

    pub fn is_accepting_answers(&self) -> bool {
        matches!(self.phase, Phase::Asking(i) if i < QUESTIONS.len())
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::Finalizing(_))
    }

    pub fn has_pending_prompt(&self) -> bool {
        self.pending_prompt.is_some()
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn report(&self) -> &KpiReport {
        &self.report
    }

    /// The `kpi_values` object as received, `Null` until a success
    pub fn kpi_raw(&self) -> &Value {
        &self.kpi_raw
    }

    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn schedule_prompt(&mut self, index: usize) {
        if self.turn_delay.is_zero() {
            self.transcript
                .push(TranscriptEntry::system(QUESTIONS[index].prompt));
        } else {
            self.pending_prompt = Some(PendingPrompt {
                index,
                due: Instant::now() + self.turn_delay,
            });
        }
    }

    fn flush_pending_prompt(&mut self) {
        if let Some(pending) = self.pending_prompt.take() {
            self.transcript
                .push(TranscriptEntry::system(QUESTIONS[pending.index].prompt));
        }
    }
}
