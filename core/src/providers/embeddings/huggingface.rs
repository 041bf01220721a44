use crate::embeddings::{model::EmbeddingModel, EmbedderError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Feature-extraction URL on the Hugging Face inference router for `model`.
#[must_use]
pub fn default_url(model: &str) -> String {
    format!("https://router.huggingface.co/hf-inference/models/{model}/pipeline/feature-extraction")
}

/// Sentence embeddings from a Hugging Face feature-extraction endpoint.
///
/// Works against both the hosted inference API and a self-hosted
/// text-embeddings-inference server, which needs no API key. Inputs longer
/// than the model's limit are truncated by the server.
pub struct HuggingFaceEmbeddingModel {
    api_key: Option<String>,
    api_url: String,
    client: Client,
}

impl HuggingFaceEmbeddingModel {
    pub fn new(api_key: Option<String>, api_url: String) -> Self {
        Self {
            api_key,
            api_url,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl EmbeddingModel for HuggingFaceEmbeddingModel {
    async fn embed(&self, data: &str) -> Result<Vec<f64>, EmbedderError> {
        let mut vectors = self.embed_batch(&[data.to_string()]).await?;
        vectors.pop().ok_or(EmbedderError::CountMismatch {
            expected: 1,
            found: 0,
        })
    }

    async fn embed_batch(&self, data: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        let request_body = json!({
            "inputs": data,
            "truncate": true,
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
            .map_err(|e| EmbedderError::RequestError(e.to_string()))?;

        if response.status().is_success() {
            let vectors = response
                .json::<Vec<Vec<f64>>>()
                .await
                .map_err(|e| EmbedderError::ParseError(e.to_string()))?;
            if vectors.len() != data.len() {
                return Err(EmbedderError::CountMismatch {
                    expected: data.len(),
                    found: vectors.len(),
                });
            }
            Ok(vectors)
        } else {
            let status = response.status().as_u16();
            let error_message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            Err(EmbedderError::ProviderError(status, error_message))
        }
    }
}
