//! Workflow graph derivation.
//!
//! Both builders are pure: the same input always yields the same nodes,
//! edges, ids and positions. Ids are derived from role and index, and edges
//! only ever point forward, so the result is a DAG with a single start and a
//! single end whenever the input is non-empty.

use agent_optimizer_sdk::{
    AnalysisResult, AnswerSet, GraphEdge, GraphNode, KpiReport, NodeRole, Position, WorkflowGraph,
    QUESTIONS,
};

use crate::utils::format_number;

// Answers layout
const ANSWER_COLUMN_STEP: f64 = 350.0;
const ANSWER_ROW_STEP: f64 = 150.0;
const ANSWER_CENTER_Y: f64 = 150.0;
/// Questions whose answers form the first tier; the rest are aggregation nodes
const CONTEXT_TIER: usize = 3;
const PREFERENCE_KEY: &str = "open_source_vs_comm";
const AUTOMATION_KEY: &str = "tasks_to_automate";

// Analysis layout
const BASE_OFFSET: f64 = 250.0;
const COLUMN_WIDTH: f64 = 250.0;
const START_Y: f64 = 250.0;
const HUMAN_Y: f64 = 0.0;
const AGENT_Y: f64 = 400.0;
const LATENCY_Y: f64 = 350.0;
const COST_Y: f64 = 450.0;

/// Labels shown for the answer-derived nodes, by question key
fn answer_label(key: &str) -> &'static str {
    match key {
        "company_industry" => "Company & Industry",
        "use_case_challenge" => "Challenge",
        "existing_stack" => "Existing Stack",
        PREFERENCE_KEY => "Preference",
        AUTOMATION_KEY => "Tasks to Automate",
        _ => "Answer",
    }
}

/// Accumulates nodes and edges with deterministic ids
#[derive(Default)]
struct GraphAccumulator {
    graph: WorkflowGraph,
}

impl GraphAccumulator {
    fn node(&mut self, id: &str, label: impl Into<String>, x: f64, y: f64, role: NodeRole) {
        self.graph.nodes.push(GraphNode {
            id: id.to_string(),
            label: label.into(),
            position: Position { x, y },
            role,
        });
    }

    fn edge(&mut self, source: &str, target: &str, label: Option<&str>, emphasized: bool) {
        self.graph.edges.push(GraphEdge {
            id: format!("e-{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
            label: label.map(str::to_string),
            emphasized,
        });
    }

    fn has_incoming(&self, id: &str) -> bool {
        self.graph.edges.iter().any(|e| e.target == id)
    }

    fn finish(self) -> WorkflowGraph {
        self.graph
    }
}

/// Y coordinates for `count` siblings spread evenly around `center`
fn spread(count: usize, center: f64, step: f64) -> impl Iterator<Item = f64> {
    let top = center - (count.saturating_sub(1) as f64) * step / 2.0;
    (0..count).map(move |i| top + i as f64 * step)
}

/// Aggregation node each context answer feeds
fn context_target(key: &str) -> &'static str {
    match key {
        "existing_stack" => "automation",
        _ => "preference",
    }
}

/// Derive the context-flow graph from the dialogue answers.
///
/// Context answers fan out from the start node. Company and challenge feed
/// the preference node, the existing stack feeds the automation target, and
/// both aggregation nodes converge on the end node.
pub fn build_from_answers(answers: &AnswerSet) -> WorkflowGraph {
    if answers.in_question_order().next().is_none() {
        return WorkflowGraph::default();
    }

    let mut acc = GraphAccumulator::default();
    acc.node("start", "Start", 0.0, ANSWER_CENTER_Y, NodeRole::Start);

    let context: Vec<(String, &str, &str)> = answers
        .in_question_order()
        .filter_map(|(q, answer)| {
            let index = QUESTIONS[..CONTEXT_TIER].iter().position(|c| c.key == q.key)?;
            Some((format!("context-{}", index), q.key, answer))
        })
        .collect();

    for ((id, key, answer), y) in context
        .iter()
        .zip(spread(context.len(), ANSWER_CENTER_Y, ANSWER_ROW_STEP))
    {
        acc.node(
            id,
            format!("{}: {}", answer_label(key), answer),
            ANSWER_COLUMN_STEP,
            y,
            NodeRole::Answer,
        );
    }

    let aggregate_x = ANSWER_COLUMN_STEP * 2.0;
    let mut aggregate_ys = spread(2, ANSWER_CENTER_Y, ANSWER_ROW_STEP);
    for (id, key) in [("preference", PREFERENCE_KEY), ("automation", AUTOMATION_KEY)] {
        let answer = answers.get(key).unwrap_or("(pending)");
        let y = aggregate_ys.next().unwrap_or(ANSWER_CENTER_Y);
        acc.node(
            id,
            format!("{}: {}", answer_label(key), answer),
            aggregate_x,
            y,
            NodeRole::Aggregate,
        );
    }

    acc.node(
        "end",
        "End",
        ANSWER_COLUMN_STEP * 3.0,
        ANSWER_CENTER_Y,
        NodeRole::End,
    );

    for (id, _, _) in &context {
        acc.edge("start", id, None, true);
    }
    for (id, key, _) in &context {
        acc.edge(id, context_target(key), None, true);
    }
    for id in ["preference", "automation"] {
        if !acc.has_incoming(id) {
            acc.edge("start", id, None, true);
        }
    }
    acc.edge("preference", "end", None, true);
    acc.edge("automation", "end", None, true);

    acc.finish()
}

/// Derive the human-vs-AI comparison graph from an analysis result
pub fn build_from_analysis(report: &KpiReport) -> WorkflowGraph {
    match report {
        KpiReport::Ready(result) => analysis_graph(result),
        KpiReport::Empty => WorkflowGraph::default(),
    }
}

fn analysis_graph(result: &AnalysisResult) -> WorkflowGraph {
    let mut acc = GraphAccumulator::default();
    let baseline = &result.baseline;

    acc.node("start", "Solution Analysis", 0.0, START_Y, NodeRole::Start);

    // Human path
    acc.node(
        "human-analysis",
        format!("Human Analysis:\n{} hr", format_number(baseline.analysis_time_hours)),
        BASE_OFFSET,
        HUMAN_Y,
        NodeRole::HumanStep,
    );
    acc.node(
        "human-dev",
        format!("Human Development:\n{} hr", format_number(baseline.dev_time_hours)),
        BASE_OFFSET + COLUMN_WIDTH,
        HUMAN_Y,
        NodeRole::HumanStep,
    );
    acc.node(
        "human-cost",
        format!("Human Cost:\n${}", format_number(baseline.cost_usd)),
        BASE_OFFSET + 2.0 * COLUMN_WIDTH,
        HUMAN_Y,
        NodeRole::HumanStep,
    );
    acc.edge("start", "human-analysis", Some("Human Path"), false);
    acc.edge("human-analysis", "human-dev", None, false);
    acc.edge("human-dev", "human-cost", None, false);

    // AI path, one column per agent
    let mut last = "start".to_string();
    for (i, agent) in result.agents.iter().enumerate() {
        let id = format!("agent-{}", i);
        acc.node(
            &id,
            format!(
                "Agent: {}\nScore: {}\nPrice: ${}",
                agent.name,
                format_number(agent.score),
                format_number(agent.cost_usd)
            ),
            BASE_OFFSET + i as f64 * COLUMN_WIDTH,
            AGENT_Y,
            NodeRole::AiStep,
        );
        acc.edge(&last, &id, (i == 0).then_some("AI Path"), true);
        last = id;
    }

    let k = result.agents.len() as f64;
    let metric_x = BASE_OFFSET + k * COLUMN_WIDTH;
    acc.node(
        "ai-latency",
        format!("AI Latency:\n{} hr", format_number(result.ai_totals.latency_hours)),
        metric_x,
        LATENCY_Y,
        NodeRole::Metric,
    );
    acc.node(
        "ai-cost",
        format!("AI Cost:\n${}", format_number(result.ai_totals.cost_usd)),
        metric_x,
        COST_Y,
        NodeRole::Metric,
    );
    acc.edge(&last, "ai-latency", None, false);
    acc.edge(&last, "ai-cost", None, false);

    acc.node(
        "end",
        "Result",
        BASE_OFFSET + (k + 1.0) * COLUMN_WIDTH,
        START_Y,
        NodeRole::End,
    );
    acc.edge("human-cost", "end", None, false);
    acc.edge("ai-latency", "end", None, false);
    acc.edge("ai-cost", "end", None, false);

    acc.finish()
}
