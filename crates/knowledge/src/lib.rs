//! Session knowledge for Sift: corpus cache, chat history, embeddings and
//! the retrieval-augmented answering engine.

pub mod cache;
pub mod embeddings;
pub mod history;
pub mod rag;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use cache::SessionCache;
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use history::HistoryStore;
pub use rag::{AnsweringEngine, EngineOptions, GenerationSettings, RagResponse};
pub use vector_index::{MemoryIndex, VectorIndex};
