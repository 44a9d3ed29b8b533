//! The fundamental analyst: formatted data in, narrative report out

use analyst_llm::providers::{OpenAIConfig, OpenAIProvider};
use analyst_llm::{CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, StopReason};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::AnalystConfig;
use crate::error::{AnalystError, Result};
use crate::formatter::FormattedPrompt;
use crate::pipeline::load_and_format_with;
use crate::prompts::{FUNDAMENTAL_SYSTEM_PROMPT, render_user_message};
use crate::report::{AnalysisReport, default_output_dir};

/// Runs fundamental analyses against one LLM provider
pub struct FundamentalAnalyst {
    provider: Arc<dyn LLMProvider>,
    config: AnalystConfig,
}

impl FundamentalAnalyst {
    /// Create an analyst over an existing provider
    pub fn new(provider: Arc<dyn LLMProvider>, config: AnalystConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    /// Create an analyst talking to the configured OpenAI-compatible endpoint
    pub fn from_config(config: AnalystConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        let provider = OpenAIProvider::with_config(
            OpenAIConfig::openrouter(api_key)
                .with_api_base(config.api_base.as_str())
                .with_timeout(config.request_timeout.as_secs().max(1)),
        )?;

        Self::new(Arc::new(provider), config)
    }

    pub fn config(&self) -> &AnalystConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// System instruction plus the rendered user message
    pub fn build_request(&self, prompt: &FormattedPrompt, current_date: &str) -> Result<CompletionRequest> {
        let user_message = render_user_message(prompt.ticker(), current_date, prompt)?;

        Ok(CompletionRequest::new(self.config.model.as_str())
            .with_system(FUNDAMENTAL_SYSTEM_PROMPT)
            .with_message(Message::user(user_message))
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature))
    }

    /// Load, format and analyze one ticker
    pub async fn analyze(&self, ticker: &str, data_dir: &Path) -> Result<AnalysisReport> {
        let prompt = load_and_format_with(ticker, data_dir, &self.config.format)?;
        let ticker = prompt.ticker().to_string();

        let current_date = Local::now().format("%B %d, %Y").to_string();
        let request = self.build_request(&prompt, &current_date)?;
        debug!(
            ticker = %ticker,
            sections = prompt.len(),
            chars = request.messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "Built analysis request"
        );

        info!(ticker = %ticker, model = %self.config.model, provider = self.provider.name(), "Requesting analysis");
        let response = self.complete_with_retry(request).await?;

        if response.message.is_blank() {
            return Err(AnalystError::EmptyResponse { ticker });
        }
        if response.stop_reason == StopReason::MaxTokens {
            warn!(ticker = %ticker, max_tokens = self.config.max_tokens, "Analysis truncated at token limit");
        }

        Ok(AnalysisReport {
            ticker,
            model: self.config.model.clone(),
            content: response.message.content,
            generated_at: Local::now(),
            usage: response.usage,
        })
    }

    /// Analyze one ticker and write the Markdown report
    ///
    /// Without `output_dir` the report goes to [`default_output_dir`].
    pub async fn analyze_and_save(&self, ticker: &str, data_dir: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
        let report = self.analyze(ticker, data_dir).await?;

        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_output_dir(data_dir, &report.timestamp()),
        };
        report.save(&output_dir)
    }

    async fn complete_with_retry(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let max_attempts = self.config.max_attempts;
        let limit = self.config.request_timeout;

        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(attempt, max_attempts, "Calling provider");

            let outcome = match timeout(limit, self.provider.complete(request.clone())).await {
                Ok(result) => result,
                Err(_) => Err(LLMError::Timeout(limit)),
            };

            match outcome {
                Ok(response) => {
                    if attempt > 1 {
                        debug!(attempt, "Provider call succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let backoff = self.config.retry_backoff(attempt - 1);
                    warn!(attempt, max_attempts, error = %err, ?backoff, "Provider call failed, retrying");
                    sleep(backoff).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
