use async_trait::async_trait;
use thiserror::Error;

use super::embeddings::embedding::Embedding;

mod flat_l2;

pub use flat_l2::FlatL2Index;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VectorStoreError {
    #[error("Cannot build an index from zero vectors")]
    EmptyIndex,
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Vector of document {0} contains non-finite values")]
    NonFiniteVector(usize),
    #[error("Query vector contains non-finite values")]
    NonFiniteQuery,
    #[error("Embedding not found")]
    EmbeddingNotFound,
}

/// A search hit: the id of a stored vector and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    pub distance: f64,
}

/// Read-only similarity index over the corpus embeddings.
///
/// A store is built once from every embedding and never changes afterwards,
/// so all queries take `&self`.
#[async_trait]
pub trait VectorStore: Send + Sync + Sized {
    /// Build the store from embeddings whose ids are their corpus positions.
    fn build(embeddings: Vec<Embedding>) -> Result<Self, VectorStoreError>;

    fn dimension(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn get_by_id(&self, id: usize) -> Result<Embedding, VectorStoreError>;

    /// The `n` stored vectors nearest to `query`, nearest first.
    async fn top_n(&self, query: &[f64], n: usize) -> Result<Vec<Neighbor>, VectorStoreError>;
}

/// Squared Euclidean distance. Callers check the lengths match.
pub(crate) fn squared_l2_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
