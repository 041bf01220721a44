use tracing::{debug, info};

use crate::{
    completion::{build_prompt, CompletionModel, GenerationParams},
    document::Document,
    embeddings::{model::EmbeddingModel, Embedder},
    error::{Error, Result},
    vector_store::{FlatL2Index, VectorStoreError},
};

/// Only the single closest document is used as context.
const CONTEXT_DOCUMENTS: usize = 1;

/// Settings for how answers are generated and returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagSettings {
    pub generation: GenerationParams,
    pub return_full_text: bool,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            generation: GenerationParams::default(),
            return_full_text: true,
        }
    }
}

/// Result of answering one query.
#[derive(Debug, Clone, PartialEq)]
pub struct RagAnswer {
    pub response: String,
    /// Id of the corpus document used as context
    pub document_id: usize,
    /// Squared Euclidean distance between the query and that document
    pub distance: f64,
}

/// The service context: corpus, index and models, built once at startup and
/// shared read-only by every request.
pub struct RagService {
    embedder: Embedder<FlatL2Index>,
    completion_model: Box<dyn CompletionModel>,
    settings: RagSettings,
}

impl RagService {
    /// Embed and index `documents`, ready to answer queries.
    ///
    /// # Errors
    /// Any embedding or indexing failure is returned; callers treat it as
    /// fatal.
    pub async fn init(
        documents: Vec<Document>,
        embedding_model: Box<dyn EmbeddingModel>,
        completion_model: Box<dyn CompletionModel>,
        settings: RagSettings,
    ) -> Result<Self> {
        let embedder = Embedder::init(documents, embedding_model).await?;
        info!("RAG service initialized");
        Ok(Self {
            embedder,
            completion_model,
            settings,
        })
    }

    /// Answer `query` using the closest corpus document as context.
    ///
    /// # Errors
    /// `Error::InvalidRequest` for an empty query; embedding, search and
    /// generation failures are passed through unchanged.
    pub async fn answer(&self, query: &str) -> Result<RagAnswer> {
        if query.is_empty() {
            return Err(Error::InvalidRequest("No query provided".to_string()));
        }

        let retrieved = self
            .embedder
            .query(query, CONTEXT_DOCUMENTS)
            .await?
            .into_iter()
            .next()
            .ok_or(VectorStoreError::EmbeddingNotFound)?;
        debug!(
            document_id = retrieved.document.id,
            distance = retrieved.distance,
            "retrieved context"
        );

        let prompt = build_prompt(&retrieved.document.data, query);
        let continuation = self
            .completion_model
            .complete(&prompt, &self.settings.generation)
            .await?;

        let response = if self.settings.return_full_text {
            format!("{prompt}{continuation}")
        } else {
            continuation
        };

        Ok(RagAnswer {
            response,
            document_id: retrieved.document.id,
            distance: retrieved.distance,
        })
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        self.embedder.documents()
    }

    #[must_use]
    pub fn index(&self) -> &FlatL2Index {
        self.embedder.vector_store()
    }
}
