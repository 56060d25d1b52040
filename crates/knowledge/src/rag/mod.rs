//! RAG (Retrieval-Augmented Generation) answering.
//!
//! Indexes a session corpus, rewrites follow-up questions against the
//! chat history, retrieves the closest documents and asks the model for a
//! grounded answer.

pub mod engine;
pub mod stages;
pub mod types;

pub use engine::{AnsweringEngine, EngineOptions};
pub use stages::GenerationSettings;
pub use types::{RagResponse, RetrievedContext, StandaloneQuery};
