//! Error types for fundamental analysis operations

use std::path::PathBuf;
use thiserror::Error;

use crate::dataset::DatasetKind;

/// Fundamental analysis errors
#[derive(Debug, Error)]
pub enum AnalystError {
    /// The ticker directory is missing or none of its datasets could be loaded
    #[error("Data not found for {ticker}: {reason}")]
    DataNotFound {
        ticker: String,
        reason: String,
    },

    /// Ticker symbol cannot name a directory under the data root
    #[error("Invalid ticker symbol: {0:?}")]
    InvalidTicker(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// User message template failed to render
    #[error("Prompt template error: {0}")]
    Template(#[from] minijinja::Error),

    /// LLM request failed
    #[error("LLM error: {0}")]
    Llm(#[from] analyst_llm::LLMError),

    /// The model answered with no text
    #[error("Empty analysis returned for {ticker}")]
    EmptyResponse {
        ticker: String,
    },

    /// Filesystem error outside of dataset parsing
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalystError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for fundamental analysis operations
pub type Result<T> = std::result::Result<T, AnalystError>;

/// A present file that could not be turned into a dataset
///
/// Never escapes the loader: it is downgraded to an absent dataset carrying
/// the reason.
#[derive(Debug, Error)]
#[error("failed to parse {dataset} from {}: {reason}", path.display())]
pub struct DatasetParseError {
    pub dataset: DatasetKind,
    pub path: PathBuf,
    pub reason: String,
}

impl DatasetParseError {
    pub(crate) fn new(dataset: DatasetKind, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            dataset,
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalystError::DataNotFound {
            ticker: "ZZZZ".to_string(),
            reason: "directory does not exist".to_string(),
        };
        assert_eq!(err.to_string(), "Data not found for ZZZZ: directory does not exist");

        let err = AnalystError::InvalidTicker("../etc".to_string());
        assert_eq!(err.to_string(), "Invalid ticker symbol: \"../etc\"");
    }

    #[test]
    fn test_parse_error_display() {
        let err = DatasetParseError::new(
            DatasetKind::BalanceSheet,
            "/data/AAPL/bs.csv",
            "no data rows",
        );
        assert_eq!(
            err.to_string(),
            "failed to parse balance_sheet from /data/AAPL/bs.csv: no data rows"
        );
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: AnalystError = analyst_llm::LLMError::AuthenticationFailed.into();
        assert!(matches!(err, AnalystError::Llm(_)));
        assert!(err.to_string().contains("authentication"));
    }
}
