//! LLM provider factory.
//!
//! This module resolves a provider name from configuration into a
//! concrete client.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, TogetherClient};
use crate::types::ProviderType;
use sift_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("together", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (required for Together)
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown LLM provider: {}", provider)))?;

    let api_key = api_key.filter(|k| !k.trim().is_empty());
    if provider_type.requires_api_key() && api_key.is_none() {
        return Err(AppError::Config(format!(
            "{} provider requires TOGETHER_API_KEY",
            provider_type
        )));
    }

    let client: Arc<dyn LlmClient> = match provider_type {
        ProviderType::Together => {
            let key = api_key.unwrap_or_default();
            match endpoint {
                Some(url) => Arc::new(TogetherClient::with_base_url(url, key)),
                None => Arc::new(TogetherClient::new(key)),
            }
        }
        ProviderType::Ollama => match endpoint {
            Some(url) => Arc::new(OllamaClient::with_base_url(url)),
            None => Arc::new(OllamaClient::new()),
        },
    };

    tracing::debug!("Created LLM client for provider {}", provider_type);
    Ok(client)
}
