//! Sequential multi-ticker runs

use chrono::Local;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::analyst::FundamentalAnalyst;
use crate::report::{TIMESTAMP_FORMAT, default_output_dir};

/// Result for one ticker of a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub ticker: String,
    /// Report path on success, error message on failure
    pub result: Result<PathBuf, String>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a batch, in input order with repeats removed
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchSummary {
    pub fn successes(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(path) => Some((o.ticker.as_str(), path.as_path())),
            Err(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(_) => None,
            Err(message) => Some((o.ticker.as_str(), message.as_str())),
        })
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// True when there was at least one ticker and none succeeded
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.success_count() == 0
    }
}

/// Analyze `tickers` one after another, recording every failure and carrying on
///
/// Without `output_dir` all reports share one timestamped default directory.
/// A ticker listed more than once is analyzed once, at its first position,
/// since a second run would land on the same report path.
pub async fn run_batch(
    analyst: &FundamentalAnalyst,
    tickers: &[String],
    data_dir: &Path,
    output_dir: Option<&Path>,
) -> BatchSummary {
    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_output_dir(data_dir, &Local::now().format(TIMESTAMP_FORMAT).to_string()),
    };

    let tickers = unique_tickers(tickers);
    info!(count = tickers.len(), output_dir = %output_dir.display(), "Starting batch analysis");

    let mut summary = BatchSummary::default();
    for (idx, ticker) in tickers.iter().enumerate() {
        info!(ticker = %ticker, position = idx + 1, total = tickers.len(), "Analyzing ticker");

        let result = match analyst.analyze_and_save(ticker, data_dir, Some(&output_dir)).await {
            Ok(path) => Ok(path),
            Err(err) => {
                error!(ticker = %ticker, error = %err, "Analysis failed, continuing with next ticker");
                Err(err.to_string())
            }
        };

        summary.outcomes.push(BatchOutcome {
            ticker: (*ticker).to_string(),
            result,
        });
    }

    info!(
        succeeded = summary.success_count(),
        failed = summary.failure_count(),
        "Batch analysis finished"
    );
    summary
}

fn unique_tickers(tickers: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    tickers
        .iter()
        .map(|ticker| ticker.trim())
        .filter(|ticker| {
            let first = seen.insert(*ticker);
            if !first {
                warn!(ticker = %ticker, "Ticker listed more than once, skipping repeat");
            }
            first
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalystConfig;
    use crate::test_support::write_complete_set;
    use analyst_llm::{CompletionRequest, CompletionResponse, LLMProvider, Message, StopReason};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Echoes the ticker line of the user message
    struct EchoProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn complete(&self, request: CompletionRequest) -> analyst_llm::Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let ticker_line = request.messages[0]
                .text()
                .lines()
                .find(|line| line.starts_with("Company Ticker:"))
                .unwrap_or_default()
                .to_string();

            Ok(CompletionResponse {
                message: Message::assistant(format!("Analysis for {ticker_line}")),
                stop_reason: StopReason::EndTurn,
                usage: None,
            })
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn analyst(provider: Arc<EchoProvider>) -> FundamentalAnalyst {
        FundamentalAnalyst::new(provider, AnalystConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_batch_continues_past_missing_ticker() {
        let data = TempDir::new().unwrap();
        write_complete_set(data.path(), "AAPL");
        write_complete_set(data.path(), "MSFT");
        let out = TempDir::new().unwrap();
        let provider = Arc::new(EchoProvider {
            calls: AtomicUsize::new(0),
        });

        let tickers = vec!["AAPL".to_string(), "ZZZZ".to_string(), "MSFT".to_string()];
        let summary = run_batch(&analyst(provider.clone()), &tickers, data.path(), Some(out.path())).await;

        let order: Vec<&str> = summary.outcomes.iter().map(|o| o.ticker.as_str()).collect();
        assert_eq!(order, ["AAPL", "ZZZZ", "MSFT"]);
        assert_eq!(summary.success_count(), 2);
        assert!(!summary.all_failed());

        let failures: Vec<_> = summary.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "ZZZZ");
        assert!(failures[0].1.contains("Data not found"));

        for (ticker, path) in summary.successes() {
            assert!(path.starts_with(out.path()));
            let written = std::fs::read_to_string(path).unwrap();
            assert!(written.contains(&format!("Company Ticker: {ticker}")));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_repeated_ticker_runs_once() {
        let data = TempDir::new().unwrap();
        write_complete_set(data.path(), "AAPL");
        write_complete_set(data.path(), "MSFT");
        let out = TempDir::new().unwrap();
        let provider = Arc::new(EchoProvider {
            calls: AtomicUsize::new(0),
        });

        let tickers = vec!["AAPL".to_string(), "AAPL".to_string(), "MSFT".to_string(), " AAPL".to_string()];
        let summary = run_batch(&analyst(provider.clone()), &tickers, data.path(), Some(out.path())).await;

        let order: Vec<&str> = summary.outcomes.iter().map(|o| o.ticker.as_str()).collect();
        assert_eq!(order, ["AAPL", "MSFT"]);
        assert_eq!(summary.success_count(), 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_batch_all_failed() {
        let data = TempDir::new().unwrap();
        let provider = Arc::new(EchoProvider {
            calls: AtomicUsize::new(0),
        });

        let tickers = vec!["ZZZZ".to_string(), "YYYY".to_string()];
        let summary = run_batch(&analyst(provider), &tickers, data.path(), Some(data.path())).await;

        assert!(summary.all_failed());
        assert_eq!(summary.failure_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_not_a_failure() {
        let data = TempDir::new().unwrap();
        let provider = Arc::new(EchoProvider {
            calls: AtomicUsize::new(0),
        });

        let summary = run_batch(&analyst(provider), &[], data.path(), Some(data.path())).await;
        assert!(summary.outcomes.is_empty());
        assert!(!summary.all_failed());
    }
}
