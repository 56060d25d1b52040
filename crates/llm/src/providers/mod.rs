//! Concrete LLM provider implementations.

pub mod ollama;
pub mod together;

pub use ollama::OllamaClient;
pub use together::TogetherClient;
