//! Prompt system for Sift.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions, built in or overridden from a directory
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod set;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, render_template};
pub use loader::{builtin_prompt, list_prompts, load_prompt, ANSWER_PROMPT_ID, CONTEXTUALIZE_PROMPT_ID};
pub use set::{unrecognized_prompts, PromptSet};
pub use types::{PromptDefinition, PromptSource};
