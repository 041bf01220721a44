use crate::{
    completion::CompletionError, config::ConfigError, embeddings::EmbedderError,
    loader::LoaderError, vector_store::VectorStoreError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),
    #[error("VectorStore error: {0}")]
    VectorStore(#[from] VectorStoreError),
    #[error("Embedder error: {0}")]
    Embedder(#[from] EmbedderError),
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// How a failure is reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something unusable
    InvalidRequest,
    /// Embedding, search, generation or startup failed
    DependencyFailure,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            _ => ErrorKind::DependencyFailure,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
