//! Values passed between the answering stages.

use crate::vector_index::ScoredDocument;

/// Separator placed between retrieved documents in the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Query used for retrieval, after history-aware rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandaloneQuery {
    pub text: String,
    /// Whether the model produced this text (as opposed to the raw query
    /// being passed through)
    pub rewritten: bool,
}

impl StandaloneQuery {
    pub fn passthrough(query: &str) -> Self {
        Self {
            text: query.to_string(),
            rewritten: false,
        }
    }
}

/// Documents selected for the answer prompt, best first.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    pub documents: Vec<ScoredDocument>,
}

impl RetrievedContext {
    /// Document texts joined for prompt injection.
    pub fn joined(&self) -> String {
        self.documents
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Highest similarity score, or 0.0 when nothing was retrieved.
    pub fn max_score(&self) -> f32 {
        self.documents.first().map_or(0.0, |d| d.score)
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Outcome of one answering run.
///
/// Only `answer` is returned to HTTP callers; the rest is kept for logging.
#[derive(Debug, Clone)]
pub struct RagResponse {
    pub answer: String,
    pub standalone_query: String,
    pub documents_used: usize,
    pub max_score: f32,
}
