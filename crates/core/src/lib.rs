//! Sift Core Library
//!
//! This crate provides the foundational utilities shared by every Sift crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Shared domain types (`Corpus`, `SessionId`)

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use types::{Corpus, CorpusEntry, SessionId, DEFAULT_SESSION};
