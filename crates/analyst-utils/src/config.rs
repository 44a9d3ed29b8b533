//! Logging configuration

use serde::{Deserialize, Serialize};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "warn,analyst_fundamental=info,fundamental_analyst=info";

/// Output format of the log layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable single-line records
    #[default]
    Text,
    /// One JSON object per record
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directives used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Record format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Override the fallback filter
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// Switch to JSON records
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Raise the fallback filter to `debug` for the analyst crates
    pub fn verbose(self) -> Self {
        self.with_default_filter("warn,analyst_fundamental=debug,analyst_llm=debug,fundamental_analyst=debug")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.default_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_builder_methods() {
        let config = LoggingConfig::default().verbose().json();
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.default_filter.contains("analyst_fundamental=debug"));
    }

    #[test]
    fn test_format_serialization() {
        let json = serde_json::to_string(&LogFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");
    }
}
