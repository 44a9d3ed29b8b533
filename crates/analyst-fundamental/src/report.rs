//! Markdown reports and where they are written

use analyst_llm::TokenUsage;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{AnalystError, Result};

/// `strftime` pattern shared by report file names and output directories
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A finished analysis for one ticker
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub model: String,
    pub content: String,
    pub generated_at: DateTime<Local>,
    pub usage: Option<TokenUsage>,
}

impl AnalysisReport {
    /// `20250115_143005`
    pub fn timestamp(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn file_name(&self) -> String {
        format!("{}_fundamental_analysis_{}.md", self.ticker, self.timestamp())
    }

    pub fn to_markdown(&self) -> String {
        format!(
            "# Fundamental Analysis Report: {}\nGenerated: {}\n\n---\n\n{}",
            self.ticker,
            self.generated_at.format("%B %d, %Y at %I:%M %p"),
            self.content
        )
    }

    /// Write the report into `output_dir`, creating it if needed
    pub fn save(&self, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir).map_err(|e| AnalystError::io(output_dir, e))?;

        let path = output_dir.join(self.file_name());
        std::fs::write(&path, self.to_markdown()).map_err(|e| AnalystError::io(&path, e))?;

        info!(ticker = %self.ticker, path = %path.display(), "Report saved");
        Ok(path)
    }
}

/// `<base>/output/<timestamp>/analyst/fundamental`
///
/// `base` is the parent of `data_dir`, or its grandparent when that parent is
/// named `raw` (the `data/raw/<source>` layout).
pub fn default_output_dir(data_dir: &Path, timestamp: &str) -> PathBuf {
    let mut base = parent_or_self(data_dir);
    if base.file_name().is_some_and(|name| name == "raw") {
        base = parent_or_self(base);
    }

    base.join("output")
        .join(timestamp)
        .join("analyst")
        .join("fundamental")
}

fn parent_or_self(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => path,
    }
}
