//! LLM integration crate for Sift.
//!
//! This crate provides a provider-agnostic abstraction for chat
//! completions. It supports multiple providers through a unified
//! trait-based interface.
//!
//! # Providers
//! - **Together**: hosted OpenAI-compatible API (default)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use sift_llm::{ChatMessage, LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new(vec![ChatMessage::user("Hello, world!")], "llama3");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmUsage, Role};
pub use factory::create_client;
pub use providers::{OllamaClient, TogetherClient};
pub use types::ProviderType;
