use async_trait::async_trait;
use std::cmp::Ordering;

use super::{squared_l2_distance, Neighbor, VectorStore, VectorStoreError};
use crate::embeddings::embedding::Embedding;

/// Exact nearest-neighbour index that compares the query against every
/// stored vector using squared Euclidean distance.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dimension: usize,
    embeddings: Vec<Embedding>,
}

#[async_trait]
impl VectorStore for FlatL2Index {
    fn build(embeddings: Vec<Embedding>) -> Result<Self, VectorStoreError> {
        let dimension = embeddings
            .first()
            .map(|e| e.embedded_data.len())
            .ok_or(VectorStoreError::EmptyIndex)?;

        for embedding in &embeddings {
            if embedding.embedded_data.len() != dimension {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: dimension,
                    found: embedding.embedded_data.len(),
                });
            }
            if embedding.embedded_data.iter().any(|v| !v.is_finite()) {
                return Err(VectorStoreError::NonFiniteVector(embedding.id));
            }
        }

        Ok(Self {
            dimension,
            embeddings,
        })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.embeddings.len()
    }

    async fn get_by_id(&self, id: usize) -> Result<Embedding, VectorStoreError> {
        self.embeddings
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(VectorStoreError::EmbeddingNotFound)
    }

    async fn top_n(&self, query: &[f64], n: usize) -> Result<Vec<Neighbor>, VectorStoreError> {
        if query.len() != self.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimension,
                found: query.len(),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(VectorStoreError::NonFiniteQuery);
        }

        let mut results = self
            .embeddings
            .iter()
            .map(|embedding| Neighbor {
                id: embedding.id,
                distance: squared_l2_distance(query, &embedding.embedded_data),
            })
            .collect::<Vec<_>>();
        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        results.truncate(n);
        Ok(results)
    }
}
