pub(crate) mod huggingface;
pub(crate) mod openai;

pub use huggingface::HuggingFaceEmbeddingModel as HuggingFaceEmbedding;
pub use openai::OpenAIEmbeddingModel as OpenAIEmbedding;
