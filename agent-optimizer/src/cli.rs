//! Command-line interface and the one-shot subcommands

use std::path::{Path, PathBuf};

use agent_optimizer_sdk::{
    AnalysisBackend, AnswerSet, FlowchartRequest, KpiReport, WorkflowGraph,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::info;

use crate::config::ConfigArgs;
use crate::graph_builder::{build_from_analysis, build_from_answers};
use crate::utils::{save_bytes, DECK_FILENAME, FLOWCHART_FILENAME};

#[derive(Parser, Debug)]
#[command(name = "agent-optimizer")]
#[command(about = "Guided assessment of agentic AI solutions against a human baseline", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the interactive terminal UI (default)
    Run,

    /// Print the workflow graph derived from a JSON file
    Graph {
        /// What the file contains
        #[arg(long, value_enum, default_value = "answers")]
        from: GraphInput,

        /// Answers object, or a deck response / `kpi_values` object
        file: PathBuf,
    },

    /// Generate a flowchart image for a role and goal
    Flowchart {
        #[arg(long)]
        role: String,

        #[arg(long)]
        goal: String,

        /// Workflow step; repeat for each step
        #[arg(long = "point")]
        points: Vec<String>,
    },

    /// Download a generated deck by its server-side name
    Download {
        pptx_file: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphInput {
    Answers,
    Analysis,
}

/// Read `path` and derive the requested graph
pub fn load_graph(from: GraphInput, path: &Path) -> Result<WorkflowGraph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;

    let graph = match from {
        GraphInput::Answers => {
            let answers: AnswerSet = serde_json::from_value(value)
                .context("Answers file must be an object of question key to answer")?;
            build_from_answers(&answers)
        }
        GraphInput::Analysis => {
            // Accept the whole deck response or just its kpi_values
            let kpi = value.get("kpi_values").cloned().unwrap_or(value);
            build_from_analysis(&KpiReport::from_value(&kpi))
        }
    };
    Ok(graph)
}

pub async fn generate_flowchart(
    backend: &dyn AnalysisBackend,
    request: &FlowchartRequest,
    output_dir: &Path,
) -> Result<PathBuf> {
    let bytes = backend
        .generate_flowchart(request)
        .await
        .context("Flowchart generation failed")?;
    let path = save_bytes(output_dir, FLOWCHART_FILENAME, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "flowchart saved");
    Ok(path)
}

pub async fn download_deck(
    backend: &dyn AnalysisBackend,
    pptx_file: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let bytes = backend
        .download_artifact(pptx_file)
        .await
        .context("Deck download failed")?;
    let path = save_bytes(output_dir, DECK_FILENAME, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "deck saved");
    Ok(path)
}
