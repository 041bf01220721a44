use crate::completion::{CompletionError, CompletionModel, GenerationParams};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_URL: &str = "https://api.openai.com/v1/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-instruct";
const SAMPLING_TEMP: f64 = 1.0;

/// Plain text continuation through an OpenAI-compatible `/v1/completions`
/// endpoint (OpenAI, vLLM, llama.cpp server, ...).
pub struct OpenAICompletionModel {
    api_key: String,
    api_url: String,
    client: reqwest::Client,
    model: String,
}

impl OpenAICompletionModel {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            api_url,
            model,
        }
    }
}

#[derive(Deserialize)]
struct OpenAICompletionResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    text: String,
}

#[async_trait]
impl CompletionModel for OpenAICompletionModel {
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, CompletionError> {
        let temperature = if params.deterministic {
            0.0
        } else {
            SAMPLING_TEMP
        };
        let request_body = json!({
            "model": self.model,
            "prompt": prompt,
            "max_tokens": params.max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| CompletionError::RequestError(e.to_string()))?;

        if response.status().is_success() {
            let response = response
                .json::<OpenAICompletionResponse>()
                .await
                .map_err(|e| CompletionError::ParseError(e.to_string()))?;

            response
                .choices
                .into_iter()
                .next()
                .map(|c| c.text)
                .ok_or(CompletionError::EmptyResponse)
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

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn model_for(server: &mockito::ServerGuard) -> OpenAICompletionModel {
        OpenAICompletionModel::new(
            "test-key".to_string(),
            format!("{}/v1/completions", server.url()),
            DEFAULT_MODEL.to_string(),
        )
    }

    #[tokio::test]
    async fn test_deterministic_request_uses_zero_temperature() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "prompt": "Context: c\nQuery: q\nAnswer:",
                "max_tokens": 100,
                "temperature": 0.0,
            })))
            .with_status(200)
            .with_body(r#"{"choices": [{"text": " It retrieves.", "index": 0, "finish_reason": "stop"}]}"#)
            .create_async()
            .await;

        let text = model_for(&server)
            .complete("Context: c\nQuery: q\nAnswer:", &GenerationParams::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(text, " It retrieves.");
    }

    #[tokio::test]
    async fn test_missing_choices_is_an_empty_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let result = model_for(&server)
            .complete("prompt", &GenerationParams::default())
            .await;
        assert_eq!(result.unwrap_err(), CompletionError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_provider_errors_carry_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let result = model_for(&server)
            .complete("prompt", &GenerationParams::default())
            .await;
        assert_eq!(
            result.unwrap_err(),
            CompletionError::ProviderError(429, "rate limited".to_string())
        );
    }

    #[tokio::test]
    #[ignore]
    async fn test_simple_openai_completion_request() {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap();
        let model =
            OpenAICompletionModel::new(api_key, DEFAULT_URL.to_string(), DEFAULT_MODEL.to_string());

        let response = model
            .complete(
                "Reply with the single word okay.\nAnswer:",
                &GenerationParams {
                    max_tokens: 5,
                    deterministic: true,
                },
            )
            .await;

        assert!(response.is_ok());
    }
}
