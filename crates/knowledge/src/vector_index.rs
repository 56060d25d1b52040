//! Vector index abstraction and the in-memory flat index.
//!
//! The index is rebuilt from the session corpus on every answer, so an
//! exact linear scan over a handful of documents is all that is needed.

use sift_core::{AppError, AppResult};
use std::cmp::Ordering;

/// A document with its embedding, as stored in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub text: String,
    pub score: f32,
    /// Insertion position, which is also the corpus position
    pub position: usize,
}

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Append a document to the index.
    fn add_document(&mut self, document: IndexedDocument) -> AppResult<()>;

    /// Search for the top-k most similar documents to the query embedding.
    ///
    /// Returns documents ordered by descending similarity score; equal
    /// scores keep insertion order.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredDocument>>;

    /// Number of indexed documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exact cosine-similarity index held in memory.
#[derive(Debug, Clone)]
pub struct MemoryIndex {
    dimensions: usize,
    documents: Vec<IndexedDocument>,
}

impl MemoryIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            documents: Vec::new(),
        }
    }

    /// Build an index from parallel slices of texts and embeddings.
    pub fn from_embeddings(
        dimensions: usize,
        texts: &[String],
        embeddings: Vec<Vec<f32>>,
    ) -> AppResult<Self> {
        if texts.len() != embeddings.len() {
            return Err(AppError::GenerationUnavailable(format!(
                "Embedding provider returned {} vectors for {} documents",
                embeddings.len(),
                texts.len()
            )));
        }

        let mut index = Self::new(dimensions);
        for (text, embedding) in texts.iter().zip(embeddings) {
            index.add_document(IndexedDocument {
                text: text.clone(),
                embedding,
            })?;
        }
        Ok(index)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl VectorIndex for MemoryIndex {
    fn add_document(&mut self, document: IndexedDocument) -> AppResult<()> {
        if document.embedding.len() != self.dimensions {
            return Err(AppError::GenerationUnavailable(format!(
                "Embedding has {} dimensions, index expects {}",
                document.embedding.len(),
                self.dimensions
            )));
        }
        self.documents.push(document);
        Ok(())
    }

    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredDocument>> {
        if query_embedding.len() != self.dimensions {
            return Err(AppError::GenerationUnavailable(format!(
                "Query embedding has {} dimensions, index expects {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<ScoredDocument> = self
            .documents
            .iter()
            .enumerate()
            .map(|(position, doc)| ScoredDocument {
                text: doc.text.clone(),
                score: cosine_similarity(query_embedding, &doc.embedding),
                position,
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored)
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}

/// Cosine similarity; zero when either vector has zero length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
