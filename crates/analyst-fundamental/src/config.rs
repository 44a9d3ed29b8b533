//! Configuration for fundamental analysis runs

use analyst_llm::providers::OPENROUTER_API_BASE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AnalystError, Result};
use crate::formatter::FormatOptions;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "xiaomi/mimo-v2-flash:free";

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const API_BASE_ENV: &str = "OPENROUTER_API_BASE";
pub const MODEL_ENV: &str = "OPENROUTER_MODEL";

/// Configuration for the analyst and its provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystConfig {
    /// OpenAI-compatible API base URL
    pub api_base: String,

    /// Bearer token; `None` until set or read from the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier sent with every request
    pub model: String,

    /// Per-attempt request timeout
    pub request_timeout: Duration,

    /// Completion token limit
    pub max_tokens: u32,

    /// Sampling temperature, provider default when `None`
    pub temperature: Option<f32>,

    /// Total attempts per ticker, including the first
    pub max_attempts: u32,

    /// Backoff before the second attempt, doubled after each retry
    pub retry_backoff_base: Duration,

    /// How the data document is rendered
    pub format: FormatOptions,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            api_base: OPENROUTER_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(120),
            max_tokens: 8192,
            temperature: None,
            max_attempts: 3,
            retry_backoff_base: Duration::from_secs(2),
            format: FormatOptions::default(),
        }
    }
}

impl AnalystConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalystConfigBuilder {
        AnalystConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(AnalystError::Config("model must not be empty".to_string()));
        }

        if self.api_base.trim().is_empty() {
            return Err(AnalystError::Config("api_base must not be empty".to_string()));
        }

        if self.max_tokens == 0 {
            return Err(AnalystError::Config("max_tokens must be greater than 0".to_string()));
        }

        if self.max_attempts == 0 {
            return Err(AnalystError::Config("max_attempts must be greater than 0".to_string()));
        }

        if self.request_timeout.is_zero() {
            return Err(AnalystError::Config("request_timeout must be greater than 0".to_string()));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(AnalystError::Config(format!(
                    "temperature must be between 0.0 and 2.0, got {temperature}"
                )));
            }
        }

        self.format.validate()
    }

    /// Get retry backoff duration for attempt number
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base * 2_u32.saturating_pow(attempt)
    }

    /// The API key, or a configuration error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AnalystError::Config(format!(
                    "no API key configured; pass --api-key or set {API_KEY_ENV}"
                ))
            })
    }
}

/// Builder for AnalystConfig
#[derive(Debug, Default)]
pub struct AnalystConfigBuilder {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    request_timeout: Option<Duration>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    max_attempts: Option<u32>,
    retry_backoff_base: Option<Duration>,
    format: Option<FormatOptions>,
}

impl AnalystConfigBuilder {
    /// Set the API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the completion token limit
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set total attempts per ticker
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set formatter options
    pub fn format(mut self, format: FormatOptions) -> Self {
        self.format = Some(format);
        self
    }

    /// Fill fields still unset from `OPENROUTER_*` environment variables
    ///
    /// Values already given to the builder are kept, so call sites can apply
    /// explicit settings before or after this.
    pub fn with_env(self) -> Self {
        self.with_env_lookup(|name| std::env::var(name).ok())
    }

    /// [`with_env`](Self::with_env) over an arbitrary variable source
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = read(API_KEY_ENV);
        }
        if self.api_base.is_none() {
            self.api_base = read(API_BASE_ENV);
        }
        if self.model.is_none() {
            self.model = read(MODEL_ENV);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AnalystConfig> {
        let defaults = AnalystConfig::default();

        let config = AnalystConfig {
            api_base: self.api_base.unwrap_or(defaults.api_base),
            api_key: self.api_key,
            model: self.model.unwrap_or(defaults.model),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature,
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            format: self.format.unwrap_or(defaults.format),
        };

        config.validate()?;
        Ok(config)
    }
}
