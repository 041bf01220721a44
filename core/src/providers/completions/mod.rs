pub(crate) mod huggingface;
pub(crate) mod openai;

pub use huggingface::HuggingFaceCompletionModel as HuggingFaceCompletion;
pub use openai::OpenAICompletionModel as OpenAICompletion;
