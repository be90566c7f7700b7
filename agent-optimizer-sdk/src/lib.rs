// Re-export async trait for backend implementors
pub use async_trait::async_trait;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

mod graph;
mod kpi;

pub use graph::*;
pub use kpi::*;

/// One step of the guided dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    /// Stable identifier, also the form field name sent to the backend
    pub key: &'static str,
    pub prompt: &'static str,
}

/// The fixed question sequence asked by the dialogue, in order
pub const QUESTIONS: [Question; 5] = [
    Question {
        key: "company_industry",
        prompt: "What is the industry of your company?",
    },
    Question {
        key: "use_case_challenge",
        prompt: "What business challenge or use-case are you addressing?",
    },
    Question {
        key: "existing_stack",
        prompt: "What is your current technology stack?",
    },
    Question {
        key: "open_source_vs_comm",
        prompt: "Do you prefer open-source or commercial solutions?",
    },
    Question {
        key: "tasks_to_automate",
        prompt: "What tasks do you want to automate?",
    },
];

/// Answers collected so far: question key -> answer text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<String, String>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, answer: impl Into<String>) {
        self.answers.insert(key.into(), answer.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// Answered questions in dialogue order (unknown keys are skipped)
    pub fn in_question_order(&self) -> impl Iterator<Item = (&'static Question, &str)> + '_ {
        QUESTIONS
            .iter()
            .filter_map(move |q| self.get(q.key).map(|answer| (q, answer)))
    }
}

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// A question or status line emitted by the dialogue itself
    SystemPrompt,
    User,
    Assistant,
}

/// One line of the on-screen dialogue history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptEntry {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::SystemPrompt,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// Role tag used by the chat endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A role-tagged chat message as sent to `/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Identifies one finalize request so late settlements can be matched or dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticket(pub u64);

/// Form fields for `/generate_deck/`, in question order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerPayload {
    pub fields: Vec<(String, String)>,
}

impl AnswerPayload {
    /// Build the payload from a complete answer set
    pub fn from_answers(answers: &AnswerSet) -> Self {
        Self {
            fields: QUESTIONS
                .iter()
                .map(|q| {
                    (
                        q.key.to_string(),
                        answers.get(q.key).unwrap_or_default().to_string(),
                    )
                })
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// The single outbound analysis request produced by a finalize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub ticket: Ticket,
    pub payload: AnswerPayload,
}

/// Body of a `/chat` request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub context: String,
    pub kpi: serde_json::Value,
    pub messages: Vec<ChatMessage>,
}

/// Body of a `/generate_flowchart` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowchartRequest {
    pub role: String,
    pub goal: String,
    pub points: Vec<String>,
}

impl FlowchartRequest {
    /// Blank key points are dropped before sending
    pub fn new(role: impl Into<String>, goal: impl Into<String>, points: Vec<String>) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            points: points
                .into_iter()
                .filter(|p| !p.trim().is_empty())
                .collect(),
        }
    }
}

/// Settled result of a successful `/generate_deck/` call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisOutcome {
    pub report: KpiReport,
    /// The `kpi_values` object exactly as received, forwarded to `/chat`
    pub kpi_raw: serde_json::Value,
    /// Server-side name of the generated deck, if any
    pub artifact: Option<String>,
}

impl AnalysisOutcome {
    /// Normalize a decoded `/generate_deck/` response body
    pub fn from_response(body: &serde_json::Value) -> Self {
        let kpi_raw = body
            .get("kpi_values")
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        let artifact = body
            .get("pptx_file")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            report: KpiReport::from_value(&kpi_raw),
            kpi_raw,
            artifact,
        }
    }
}

/// Failures talking to the analysis service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Non-2xx response; message is the backend's `error` field when present
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

/// Request/response contract of the remote analysis service
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Submit the dialogue answers for KPI analysis
    async fn generate_deck(&self, payload: &AnswerPayload)
        -> Result<AnalysisOutcome, TransportError>;

    /// Free-form follow-up conversation; returns the assistant reply
    async fn chat(&self, request: &ChatRequest) -> Result<String, TransportError>;

    /// Fetch the generated deck by its server-side name
    async fn download_artifact(&self, artifact: &str) -> Result<Vec<u8>, TransportError>;

    /// Render a flowchart image for a role/goal/points triple
    async fn generate_flowchart(
        &self,
        request: &FlowchartRequest,
    ) -> Result<Vec<u8>, TransportError>;
}
