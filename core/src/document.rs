/// The fixed corpus the service answers from when no other source is configured.
pub const FELLOWCRAFT_DOCUMENTS: [&str; 6] = [
    "Fellowcraft is a personal coaching app that provides guided meditations and structured learning programs.",
    "Users complete sequential content and unlock new lessons after marking previous ones complete.",
    "The CMS manages content, users, and notifications, integrating with AWS Cognito.",
    "The Node.js backend handles user authentication and communication with the Python RAG service.",
    "The Python RAG service handles vectorization, retrieval, and generation of responses.",
    "The MySQL database stores user data and query logs.",
];

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Document {
    /// Position of the document in the corpus
    pub id: usize,
    pub data: String,
}

impl Document {
    pub fn new(id: usize, data: impl Into<String>) -> Self {
        Self {
            id,
            data: data.into(),
        }
    }
}

/// Numbers the given texts in order, producing the corpus documents.
pub fn corpus_from_texts<I, S>(texts: I) -> Vec<Document>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    texts
        .into_iter()
        .enumerate()
        .map(|(id, data)| Document::new(id, data))
        .collect()
}

#[must_use]
pub fn builtin_corpus() -> Vec<Document> {
    corpus_from_texts(FELLOWCRAFT_DOCUMENTS)
}
