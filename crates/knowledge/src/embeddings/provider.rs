//! Embedding provider trait and factory.

use super::providers::{MockProvider, OllamaProvider, OpenAiEmbeddingProvider};
use clause_core::config::EmbeddingSettings;
use clause_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "openai", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    ///
    /// The result has one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from settings.
///
/// Returns `Ok(None)` when embeddings are disabled (`provider: none`). The
/// `openai` provider needs an API key; `api_key` is whatever the caller
/// resolved from config or environment.
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Option<Arc<dyn EmbeddingProvider>>> {
    match settings.provider.as_str() {
        "none" => Ok(None),

        "mock" => Ok(Some(Arc::new(MockProvider::new(settings.dimensions)))),

        "ollama" => {
            let provider = OllamaProvider::new(
                settings.endpoint.as_deref(),
                &settings.model,
                settings.dimensions,
            )?;
            Ok(Some(Arc::new(provider)))
        }

        "openai" => {
            let api_key = api_key.filter(|key| !key.trim().is_empty()).ok_or_else(|| {
                AppError::Config("OpenAI embedding provider requires an API key".to_string())
            })?;
            let provider = OpenAiEmbeddingProvider::new(
                settings.endpoint.as_deref(),
                api_key,
                &settings.model,
                settings.dimensions,
            );
            Ok(Some(Arc::new(provider)))
        }

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: none, mock, ollama, openai",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> EmbeddingSettings {
        EmbeddingSettings {
            provider: provider.to_string(),
            dimensions: 384,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_disabled_provider() {
        assert!(create_provider(&settings("none"), None).unwrap().is_none());
    }

    #[test]
    fn test_create_mock_provider() {
        let provider = create_provider(&settings("mock"), None).unwrap().unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = create_provider(&settings("openai"), Some("sk-test"))
            .unwrap()
            .unwrap();
        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_name(), "text-embedding-3-small");

        assert!(create_provider(&settings("openai"), None).is_err());
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider(&settings("gguf"), None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&settings("mock"), None).unwrap().unwrap();
        let embedding = provider.embed("overtime pay").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
