//! Embedding providers used to index corpus entries and queries.
//!
//! Provides provider-agnostic embedding generation behind the
//! [`EmbeddingProvider`] trait.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
