/// Builtin text completion providers
pub mod completions;

/// Builtin embedding providers
pub mod embeddings;
