use crate::embeddings::{model::EmbeddingModel, EmbedderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_URL: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Embeddings from an OpenAI-compatible `/v1/embeddings` endpoint.
pub struct OpenAIEmbeddingModel {
    api_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl OpenAIEmbeddingModel {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            api_url,
            api_key,
            model,
            client: Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct OpenAIEmbeddingResponse {
    pub data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize)]
struct OpenAIEmbeddingData {
    pub embedding: Vec<f64>,
    pub index: usize,
}

/// The API may return the vectors in any order; put them back in input order.
fn ordered_embeddings(
    response: OpenAIEmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f64>>, EmbedderError> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(EmbedderError::CountMismatch {
            expected,
            found: data.len(),
        });
    }
    data.sort_by_key(|d| d.index);
    if let Some((position, d)) = data.iter().enumerate().find(|(i, d)| d.index != *i) {
        return Err(EmbedderError::ParseError(format!(
            "expected embedding index {position}, found {}",
            d.index
        )));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingModel for OpenAIEmbeddingModel {
    async fn embed(&self, data: &str) -> Result<Vec<f64>, EmbedderError> {
        let mut vectors = self.embed_batch(&[data.to_string()]).await?;
        vectors.pop().ok_or(EmbedderError::CountMismatch {
            expected: 1,
            found: 0,
        })
    }

    async fn embed_batch(&self, data: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        let request_body = json!({
                "input": data,
                "model": self.model,
        });
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| EmbedderError::RequestError(e.to_string()))?;

        if response.status().is_success() {
            let response = response
                .json::<OpenAIEmbeddingResponse>()
                .await
                .map_err(|e| EmbedderError::ParseError(e.to_string()))?;

            ordered_embeddings(response, data.len())
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
