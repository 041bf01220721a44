use crate::completion::{CompletionError, CompletionModel, GenerationParams};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_MODEL: &str = "gpt2";

/// Text-generation URL on the Hugging Face inference router for `model`.
#[must_use]
pub fn default_url(model: &str) -> String {
    format!("https://router.huggingface.co/hf-inference/models/{model}")
}

/// Text generation through the Hugging Face inference API or a
/// text-generation-inference server.
pub struct HuggingFaceCompletionModel {
    api_key: Option<String>,
    api_url: String,
    client: reqwest::Client,
}

impl HuggingFaceCompletionModel {
    pub fn new(api_key: Option<String>, api_url: String) -> Self {
        Self {
            api_key,
            api_url,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// The hosted API answers with a list, TGI's `/generate` with a single object.
#[derive(Deserialize)]
#[serde(untagged)]
enum HuggingFaceGenerationResponse {
    List(Vec<GeneratedText>),
    Single(GeneratedText),
}

impl HuggingFaceGenerationResponse {
    fn into_text(self) -> Option<String> {
        match self {
            Self::List(list) => list.into_iter().next().map(|g| g.generated_text),
            Self::Single(g) => Some(g.generated_text),
        }
    }
}

#[async_trait]
impl CompletionModel for HuggingFaceCompletionModel {
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, CompletionError> {
        let request_body = json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": params.max_tokens,
                "do_sample": !params.deterministic,
                "return_full_text": false,
            },
        });

        let mut request = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(&request_body);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }
        let response = request
            .send()
            .await
            .map_err(|e| CompletionError::RequestError(e.to_string()))?;

        if response.status().is_success() {
            let response = response
                .json::<HuggingFaceGenerationResponse>()
                .await
                .map_err(|e| CompletionError::ParseError(e.to_string()))?;

            response.into_text().ok_or(CompletionError::EmptyResponse)
        } else {
            let status = response.status().as_u16();
            let error_message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            Err(CompletionError::ProviderError(status, error_message))
        }
    }
}
