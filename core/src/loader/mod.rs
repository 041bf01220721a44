mod files;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::document::{builtin_corpus, corpus_from_texts, Document};

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Invalid glob-pattern")]
    InvalidGlobPattern(#[from] glob::PatternError),
    #[error("Failed to read corpus file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk corpus directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No documents found for the corpus")]
    NoDocuments,
}

/// Where the startup corpus comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CorpusSource {
    /// The six Fellowcraft sentences
    #[default]
    Builtin,
    /// Documents listed directly in the config
    Inline { documents: Vec<String> },
    /// One document per file matched by the glob patterns, ordered by path
    Files { patterns: Vec<String> },
}

/// Loads the corpus once, numbering documents in load order.
///
/// # Errors
/// Fails on a bad glob pattern, an unreadable file, or when the source
/// yields no documents at all.
pub fn load_corpus(source: &CorpusSource) -> Result<Vec<Document>, LoaderError> {
    let documents = match source {
        CorpusSource::Builtin => builtin_corpus(),
        CorpusSource::Inline { documents } => corpus_from_texts(documents.iter().cloned()),
        CorpusSource::Files { patterns } => {
            let paths = files::resolve_input_to_files(patterns)?;
            let mut texts = Vec::with_capacity(paths.len());
            for path in paths {
                let text = files::parse_file(&path)?;
                if text.trim().is_empty() {
                    continue;
                }
                texts.push(text);
            }
            corpus_from_texts(texts)
        }
    };

    if documents.is_empty() {
        return Err(LoaderError::NoDocuments);
    }
    info!("Loaded {} corpus documents", documents.len());
    Ok(documents)
}
