//! Fundamental analysis from collected per-ticker data
//!
//! This crate turns the files scraped for one ticker into an LLM-written
//! fundamental analysis report. It includes:
//!
//! - Loading of the seven per-ticker datasets (company info, key statistics,
//!   historical valuation, annual statements) with tolerance for missing or
//!   malformed files
//! - Deterministic rendering of the loaded data into one sectioned text document
//! - A [`FundamentalAnalyst`] that sends the document to an LLM provider with
//!   timeout and retry, and writes the answer as a Markdown report
//! - A sequential batch driver that records per-ticker failures and carries on
//!
//! # Architecture
//!
//! `loader` → `formatter` is a synchronous pipeline with no network access;
//! [`load_and_format`] exposes it on its own. The analyst adds the
//! [`analyst_llm::LLMProvider`] call on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use analyst_fundamental::{AnalystConfig, FundamentalAnalyst};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AnalystConfig::builder().with_env().build()?;
//!     let analyst = FundamentalAnalyst::from_config(config)?;
//!
//!     let path = analyst
//!         .analyze_and_save("AAPL", Path::new("data/raw/stock_data"), None)
//!         .await?;
//!     println!("Report saved to {}", path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod analyst;
pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod formatter;
pub mod loader;
pub mod pipeline;
pub mod prompts;
pub mod report;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use analyst::FundamentalAnalyst;
pub use batch::{BatchOutcome, BatchSummary, run_batch};
pub use config::{AnalystConfig, AnalystConfigBuilder, DEFAULT_MODEL};
pub use dataset::{
    AbsenceReason, AggregatedTickerData, DatasetContent, DatasetKind, DatasetShape, ScalarMap,
    SourceDataset, Table, TableRow,
};
pub use error::{AnalystError, DatasetParseError, Result};
pub use formatter::{AbsentPolicy, FormatOptions, FormattedPrompt, PromptSection, format_ticker_data};
pub use loader::{discover_tickers, load_ticker_data};
pub use pipeline::{load_and_format, load_and_format_with};
pub use report::{AnalysisReport, default_output_dir};
