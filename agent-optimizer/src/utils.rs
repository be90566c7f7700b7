//! Utility functions for paths, saved artifacts and number formatting

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Filename the generated deck is saved under
pub const DECK_FILENAME: &str = "agentic_ai_deck.pptx";
/// Filename a generated flowchart image is saved under
pub const FLOWCHART_FILENAME: &str = "flowchart.png";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "agent-optimizer", "agent-optimizer")
}

/// Default directory downloaded artifacts are written to
pub fn default_output_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default log file location (the TUI owns the terminal, so logs go to disk)
pub fn default_log_path() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        proj_dirs.data_dir().join("agent-optimizer.log")
    } else {
        PathBuf::from(".agent-optimizer.log")
    }
}

/// Write `bytes` to `dir/filename`, creating `dir` if needed
pub async fn save_bytes(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(filename);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Whole numbers without a trailing ".0", fractions to two places
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
