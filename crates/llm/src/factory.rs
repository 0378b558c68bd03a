//! LLM provider factory.
//!
//! This module provides a factory for creating LLM clients based on
//! application configuration. It handles provider resolution and secret
//! injection.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama", "none")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Returns
/// A shared trait object implementing `LlmClient`
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - Provider is disabled
/// - Required secrets are missing
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or(crate::providers::ollama::DEFAULT_OLLAMA_URL);
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        Some(ProviderType::OpenAI) => {
            let api_key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| "OpenAI provider requires API key".to_string())?;
            let base_url = endpoint.unwrap_or(crate::providers::openai::DEFAULT_OPENAI_URL);
            Ok(Arc::new(OpenAiClient::with_base_url(base_url, api_key)))
        }
        Some(ProviderType::Disabled) => Err("Model provider is disabled".to_string()),
        None => Err(format!("Unknown provider: {}", provider)),
    }
}
