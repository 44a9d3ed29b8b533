//! LLM provider trait definition

use async_trait::async_trait;
use crate::{CompletionRequest, CompletionResponse, Result};

/// Trait for LLM providers
///
/// Implementations wrap one remote service. Callers own the retry and timeout
/// policy; a provider performs exactly one request per `complete` call.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with messages and parameters
    ///
    /// # Returns
    ///
    /// The completion response with the assistant's message and metadata
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai", "openrouter")
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Message, StopReason};
    use std::sync::Arc;

    struct FixedProvider;

    #[async_trait]
    impl LLMProvider for FixedProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            Ok(CompletionResponse {
                message: Message::assistant(format!("{} messages", request.messages.len())),
                stop_reason: StopReason::EndTurn,
                usage: None,
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_provider_as_trait_object() {
        let provider: Arc<dyn LLMProvider> = Arc::new(FixedProvider);
        let request = CompletionRequest::new("any").with_message(Message::user("Analyze AAPL"));

        let response = tokio_test::block_on(provider.complete(request)).unwrap();
        assert_eq!(response.message.text(), "1 messages");
        assert_eq!(provider.name(), "fixed");
    }
}
