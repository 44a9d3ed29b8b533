//! Deterministic text rendering of [`AggregatedTickerData`]
//!
//! Output depends only on the loaded record and the [`FormatOptions`], so two
//! runs over an unchanged directory produce byte-identical documents.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dataset::{AggregatedTickerData, DatasetContent, DatasetKind, ScalarMap, Table};
use crate::error::{AnalystError, Result};

/// Rendering of a missing value
pub const MISSING_VALUE: &str = "N/A";

/// Section body used for absent datasets under [`AbsentPolicy::Placeholder`]
pub const NO_DATA_PLACEHOLDER: &str = "(no data available)";

const CELL_SEPARATOR: &str = " | ";

/// What to do with a dataset that could not be loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentPolicy {
    /// Drop the section
    #[default]
    Omit,
    /// Keep the section with a fixed placeholder body
    Placeholder,
}

/// Formatter knobs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub absent_policy: AbsentPolicy,
    /// Keep only the first N period columns of each financial statement
    pub max_statement_periods: Option<usize>,
}

impl FormatOptions {
    pub fn with_absent_policy(mut self, policy: AbsentPolicy) -> Self {
        self.absent_policy = policy;
        self
    }

    pub fn with_max_statement_periods(mut self, periods: usize) -> Self {
        self.max_statement_periods = Some(periods);
        self
    }

    /// A zero period limit would strip every statement down to its labels
    pub fn validate(&self) -> Result<()> {
        if self.max_statement_periods == Some(0) {
            return Err(AnalystError::Config(
                "max_statement_periods must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// One titled block of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptSection {
    pub kind: DatasetKind,
    pub title: &'static str,
    pub body: String,
}

/// The formatted document for one ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedPrompt {
    ticker: String,
    sections: Vec<PromptSection>,
}

impl FormattedPrompt {
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Sections in fixed dataset order
    pub fn sections(&self) -> &[PromptSection] {
        &self.sections
    }

    pub fn section(&self, kind: DatasetKind) -> Option<&PromptSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Full text: a heading, then `## Title` blocks separated by blank lines
    pub fn render(&self) -> String {
        let mut out = format!("# Fundamental Analysis Data for {}\n", self.ticker);
        for section in &self.sections {
            out.push('\n');
            out.push_str("## ");
            out.push_str(section.title);
            out.push('\n');
            out.push_str(&section.body);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for FormattedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render every dataset of `data` into its section
pub fn format_ticker_data(data: &AggregatedTickerData, options: &FormatOptions) -> FormattedPrompt {
    let sections = data
        .datasets()
        .iter()
        .filter_map(|dataset| {
            let spec = dataset.kind.spec();
            let body = match &dataset.content {
                DatasetContent::ScalarMap(map) => format_scalar_map(map),
                DatasetContent::Tabular(table) => match options.max_statement_periods {
                    Some(periods) if spec.periodic => format_table(&table.first_columns(periods)),
                    _ => format_table(table),
                },
                DatasetContent::Absent(_) => match options.absent_policy {
                    AbsentPolicy::Omit => return None,
                    AbsentPolicy::Placeholder => NO_DATA_PLACEHOLDER.to_string(),
                },
            };

            Some(PromptSection {
                kind: dataset.kind,
                title: spec.title,
                body,
            })
        })
        .collect();

    FormattedPrompt {
        ticker: data.ticker().to_string(),
        sections,
    }
}

/// `key: value` lines in source order
pub fn format_scalar_map(map: &ScalarMap) -> String {
    map.iter()
        .map(|(key, value)| format!("{}: {}", or_missing(key), value.unwrap_or(MISSING_VALUE)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Aligned grid: header line, then one line per row
pub fn format_table(table: &Table) -> String {
    let mut grid: Vec<Vec<&str>> = Vec::with_capacity(table.row_count() + 1);

    let mut header = Vec::with_capacity(table.column_count() + 1);
    header.push(table.index_header());
    header.extend(table.columns().iter().map(String::as_str));
    grid.push(header);

    for row in table.rows() {
        let mut line = Vec::with_capacity(row.cells.len() + 1);
        line.push(or_missing(&row.label));
        line.extend(row.cells.iter().map(|cell| cell.as_deref().unwrap_or(MISSING_VALUE)));
        grid.push(line);
    }

    let mut widths = vec![0; table.column_count() + 1];
    for line in &grid {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    // The last column is left unpadded so lines carry no trailing fill.
    let last = widths.len() - 1;
    grid.iter()
        .map(|line| {
            let cells: Vec<String> = line
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(col, (cell, &width))| {
                    if col == last {
                        (*cell).to_string()
                    } else {
                        format!("{cell:<width$}")
                    }
                })
                .collect();
            cells.join(CELL_SEPARATOR)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_missing(label: &str) -> &str {
    if label.is_empty() { MISSING_VALUE } else { label }
}
