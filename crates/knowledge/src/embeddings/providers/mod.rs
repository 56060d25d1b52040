//! Concrete embedding provider implementations.

pub mod mock;
pub mod ollama;
pub mod together;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use together::TogetherProvider;
