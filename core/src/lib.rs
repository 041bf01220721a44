//! # fellowcraft_rag
//!
//! The retrieval-augmented generation pipeline behind the Fellowcraft RAG
//! service: a small fixed corpus is embedded once at startup, and each query
//! is answered by retrieving the closest document and handing it to a text
//! generation model as context.
//!
//! ## Pieces
//!
//! - **Loader**: produces the startup corpus (builtin, inline or from files)
//! - **Embedder**: embeds the corpus and incoming queries through an `EmbeddingModel`
//! - **Vector store**: exact nearest-neighbour search over the corpus vectors
//! - **Completion**: the `CompletionModel` seam and the prompt template
//! - **Providers**: Hugging Face and OpenAI-compatible HTTP backends
//! - **RagService**: the context object wiring the above into one request flow
//!
//! ## Example
//!
//! ```rust,no_run
//! use fellowcraft_rag::config::ServiceConfig;
//! use fellowcraft_rag::loader::load_corpus;
//! use fellowcraft_rag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> fellowcraft_rag::error::Result<()> {
//!     let config = ServiceConfig::load()?;
//!     let service = RagService::init(
//!         load_corpus(&config.corpus)?,
//!         config.embedder.build()?,
//!         config.generator.build()?,
//!         config.rag_settings(),
//!     )
//!     .await?;
//!
//!     let answer = service.answer("What does the RAG service do?").await?;
//!     println!("{}", answer.response);
//!     Ok(())
//! }
//! ```

/// Text generation seam and prompt construction
pub mod completion;

/// Service configuration
pub mod config;

/// Corpus documents
pub mod document;

/// Text embeddings support
pub mod embeddings;

/// Error types for all library operations
pub mod error;

/// Startup corpus loading
pub mod loader;

/// Builtin completion and embedding model providers
pub mod providers;

/// The embed, retrieve and generate pipeline
pub mod rag;

/// Vector storage and retrieval
pub mod vector_store;
