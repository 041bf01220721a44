use crate::embeddings::EmbedderError;
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed a single piece of text.
    async fn embed(&self, data: &str) -> Result<Vec<f64>, EmbedderError>;

    /// Embed several texts, keeping the input order.
    ///
    /// Falls back to one `embed` call per text; providers with a batch
    /// endpoint override it.
    async fn embed_batch(&self, data: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        let mut vectors = Vec::with_capacity(data.len());
        for text in data {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}
