use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_MAX_TOKENS: usize = 100;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompletionError {
    #[error("Provider error -> HTTP Status {0}: {1}")]
    ProviderError(u16, String),
    #[error("RequestError: {0}")]
    RequestError(String),
    #[error("ParseError: {0}")]
    ParseError(String),
    #[error("Provider returned no completion")]
    EmptyResponse,
}

/// Decoding parameters sent with every prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationParams {
    /// Upper bound on newly generated tokens
    pub max_tokens: usize,
    /// Greedy decoding when `true`, sampling otherwise
    pub deterministic: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            deterministic: true,
        }
    }
}

#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Continue `prompt`, returning only the newly generated text.
    ///
    /// Generation ends at `max_tokens` or when the model emits its
    /// end-of-sequence token, whichever comes first.
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, CompletionError>;
}

/// Prompt handed to the generator: the retrieved context, the user's query
/// and an open `Answer:` slot for the model to fill.
#[must_use]
pub fn build_prompt(context: &str, query: &str) -> String {
    format!("Context: {context}\nQuery: {query}\nAnswer:")
}
