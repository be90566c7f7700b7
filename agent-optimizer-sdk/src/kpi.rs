//! KPI response model and boundary normalization.
//!
//! The analysis service has been observed returning two shapes for
//! `kpi_values.human_vs_ai`:
//!
//! - **Dialogue shape** (canonical): `analysis_time_hr`, `dev_time_hr`,
//!   `cost_usd`, with agents carrying `latency_hr` / `cost_usd`.
//! - **Workflow shape**: `human_analysis_time`, `human_development_time`,
//!   `human_cost`, `ai_compute_latency`, `ai_cost`, with agents carrying
//!   `price` instead of `cost_usd`.
//!
//! Both are mapped onto [`AnalysisResult`] here. Anything missing the agent
//! list or the baseline collapses to [`KpiReport::Empty`], so downstream code
//! never deals with absent fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One candidate AI solution returned by the analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub latency_hours: f64,
    pub cost_usd: f64,
    pub score: f64,
    /// Not reported by every backend; 0 when absent
    pub dev_time_hours: f64,
}

/// Reference metrics for the human-performed process
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HumanBaseline {
    pub analysis_time_hours: f64,
    pub dev_time_hours: f64,
    pub cost_usd: f64,
}

/// AI-side totals shown on the graph's metric nodes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AiTotals {
    pub latency_hours: f64,
    pub cost_usd: f64,
}

/// Which wire shape a result was normalized from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiShape {
    Dialogue,
    Workflow,
}

/// Normalized KPI comparison for one finalize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// In backend order; the first entry is the primary agent
    pub agents: Vec<Agent>,
    pub baseline: HumanBaseline,
    pub ai_totals: AiTotals,
    pub commentary: String,
    pub insights: Vec<String>,
    pub shape: KpiShape,
}

impl AnalysisResult {
    pub fn primary_agent(&self) -> Option<&Agent> {
        self.agents.first()
    }
}

/// What every consumer of the analysis sees
#[derive(Debug, Clone, PartialEq, Default)]
pub enum KpiReport {
    #[default]
    Empty,
    Ready(AnalysisResult),
}

impl KpiReport {
    /// Normalize a `kpi_values` object
    pub fn from_value(value: &Value) -> Self {
        let raw: RawKpiValues = match serde_json::from_value(value.clone()) {
            Ok(raw) => raw,
            Err(_) => return KpiReport::Empty,
        };
        raw.normalize().map_or(KpiReport::Empty, KpiReport::Ready)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, KpiReport::Empty)
    }

    pub fn as_ready(&self) -> Option<&AnalysisResult> {
        match self {
            KpiReport::Ready(result) => Some(result),
            KpiReport::Empty => None,
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawKpiValues {
    // Loosely typed so one odd field never discards the whole report
    agents: Option<Value>,
    human_vs_ai: Option<RawHumanVsAi>,
    comment: Option<Value>,
    insights: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAgent {
    name: Option<Value>,
    latency_hr: Option<Value>,
    cost_usd: Option<Value>,
    price: Option<Value>,
    score: Option<Value>,
    dev_time_hr: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHumanVsAi {
    // Dialogue shape
    analysis_time_hr: Option<Value>,
    dev_time_hr: Option<Value>,
    cost_usd: Option<Value>,
    // Workflow shape
    human_analysis_time: Option<Value>,
    human_development_time: Option<Value>,
    human_cost: Option<Value>,
    ai_compute_latency: Option<Value>,
    ai_cost: Option<Value>,
}

impl RawHumanVsAi {
    fn shape(&self) -> Option<KpiShape> {
        if self.analysis_time_hr.is_some() || self.dev_time_hr.is_some() || self.cost_usd.is_some() {
            Some(KpiShape::Dialogue)
        } else if self.human_analysis_time.is_some()
            || self.human_development_time.is_some()
            || self.human_cost.is_some()
        {
            Some(KpiShape::Workflow)
        } else {
            None
        }
    }
}

impl RawAgent {
    fn normalize(&self, index: usize) -> Agent {
        let name = match &self.name {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("Agent {}", index + 1),
        };
        Agent {
            name,
            latency_hours: non_negative(number(&self.latency_hr)),
            cost_usd: non_negative(number(&self.cost_usd).or_else(|| number(&self.price))),
            score: number(&self.score).unwrap_or(0.0),
            dev_time_hours: non_negative(number(&self.dev_time_hr)),
        }
    }
}

impl RawKpiValues {
    fn normalize(self) -> Option<AnalysisResult> {
        let raw_agents = match self.agents? {
            Value::Array(entries) => entries,
            _ => return None,
        };
        let hva = self.human_vs_ai?;
        let shape = hva.shape()?;

        // Entries that are not objects carry nothing usable
        let agents: Vec<Agent> = raw_agents
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|entry| serde_json::from_value::<RawAgent>(entry).ok())
            .enumerate()
            .map(|(i, a)| a.normalize(i))
            .collect();

        let (baseline, reported_latency, reported_cost) = match shape {
            KpiShape::Dialogue => (
                HumanBaseline {
                    analysis_time_hours: non_negative(number(&hva.analysis_time_hr)),
                    dev_time_hours: non_negative(number(&hva.dev_time_hr)),
                    cost_usd: non_negative(number(&hva.cost_usd)),
                },
                None,
                None,
            ),
            KpiShape::Workflow => (
                HumanBaseline {
                    analysis_time_hours: non_negative(number(&hva.human_analysis_time)),
                    dev_time_hours: non_negative(number(&hva.human_development_time)),
                    cost_usd: non_negative(number(&hva.human_cost)),
                },
                number(&hva.ai_compute_latency),
                number(&hva.ai_cost),
            ),
        };

        let primary = agents.first();
        let ai_totals = AiTotals {
            latency_hours: non_negative(
                reported_latency.or_else(|| primary.map(|a| a.latency_hours)),
            ),
            cost_usd: non_negative(reported_cost.or_else(|| primary.map(|a| a.cost_usd))),
        };

        let insights = match self.insights {
            Some(Value::Array(items)) => items.into_iter().filter_map(text).collect(),
            Some(single) => text(single).into_iter().collect(),
            None => Vec::new(),
        };

        Some(AnalysisResult {
            agents,
            baseline,
            ai_totals,
            commentary: self.comment.and_then(text).unwrap_or_default(),
            insights,
            shape,
        })
    }
}

/// Read a JSON number or a numeric string such as `"$1,200"` or `"40 hours"`
fn number(value: &Option<Value>) -> Option<f64> {
    match value.as_ref()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',')
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}

/// Free text from any JSON value; null and blank strings are dropped
fn text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}
