pub mod embedding;
pub mod model;

use embedding::Embedding;
use model::EmbeddingModel;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    document::Document,
    vector_store::{Neighbor, VectorStore, VectorStoreError},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbedderError {
    #[error("RequestError: {0}")]
    RequestError(String),
    #[error("ParseError: {0}")]
    ParseError(String),
    #[error("Provider error -> HTTP Status {0}: {1}")]
    ProviderError(u16, String),
    #[error("Expected {expected} embeddings, provider returned {found}")]
    CountMismatch { expected: usize, found: usize },
    #[error("Vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),
}

/// A corpus document matched by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieved {
    pub document: Document,
    pub distance: f64,
}

/// Owns the corpus, its vector store, and the model used to embed both the
/// corpus and incoming queries.
pub struct Embedder<V: VectorStore> {
    documents: Vec<Document>,
    vector_store: V,
    embedding_model: Box<dyn EmbeddingModel>,
}

impl<V: VectorStore> Embedder<V> {
    /// Embed every document in one batch and build the vector store from
    /// the results.
    ///
    /// # Errors
    /// Any failure of the embedding model or the store build aborts
    /// initialization.
    pub async fn init(
        documents: Vec<Document>,
        embedding_model: Box<dyn EmbeddingModel>,
    ) -> Result<Self, EmbedderError> {
        let texts: Vec<String> = documents.iter().map(|d| d.data.clone()).collect();
        let vectors = embedding_model.embed_batch(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(EmbedderError::CountMismatch {
                expected: documents.len(),
                found: vectors.len(),
            });
        }

        let embeddings = documents
            .iter()
            .zip(vectors)
            .map(|(doc, embedded_data)| Embedding {
                id: doc.id,
                embedded_data,
                raw_data: doc.data.clone(),
            })
            .collect();
        let vector_store = V::build(embeddings)?;
        info!(
            "Indexed {} documents, embedding dimension {}",
            vector_store.len(),
            vector_store.dimension()
        );

        Ok(Self {
            documents,
            vector_store,
            embedding_model,
        })
    }

    /// return the documents nearest to a query, nearest first
    pub async fn query(&self, query: &str, top_n: usize) -> Result<Vec<Retrieved>, EmbedderError> {
        let query_vector = self.embedding_model.embed(query).await?;
        let neighbors = self.vector_store.top_n(&query_vector, top_n).await?;
        debug!(?neighbors, "vector store lookup");

        neighbors
            .into_iter()
            .map(|Neighbor { id, distance }| {
                self.documents
                    .iter()
                    .find(|d| d.id == id)
                    .cloned()
                    .map(|document| Retrieved { document, distance })
                    .ok_or(EmbedderError::VectorStore(VectorStoreError::EmbeddingNotFound))
            })
            .collect()
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    #[must_use]
    pub fn vector_store(&self) -> &V {
        &self.vector_store
    }
}
