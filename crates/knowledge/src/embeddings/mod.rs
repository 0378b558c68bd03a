//! Question and passage embeddings.
//!
//! Embeddings are an optional enhancement. [`QueryEmbedder`] hides provider
//! failures from retrieval: a question that cannot be embedded is searched
//! lexically only.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

use clause_core::AppResult;
use std::sync::Arc;

/// Best-effort embedder used by retrieval and corpus loading.
#[derive(Debug, Clone, Default)]
pub struct QueryEmbedder {
    provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl QueryEmbedder {
    pub fn new(provider: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        Self { provider }
    }

    /// Embedder that never produces vectors.
    pub fn disabled() -> Self {
        Self { provider: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> Option<&Arc<dyn EmbeddingProvider>> {
        self.provider.as_ref()
    }

    /// Embed one text, or `None` when disabled or on any failure.
    pub async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let provider = self.provider.as_ref()?;

        match provider.embed(text).await {
            Ok(vector) if vector.len() == provider.dimensions() => Some(vector),
            Ok(vector) => {
                tracing::warn!(
                    provider = provider.provider_name(),
                    got = vector.len(),
                    expected = provider.dimensions(),
                    "Embedding has unexpected dimensions, continuing lexical-only"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    provider = provider.provider_name(),
                    error = %e,
                    "Embedding unavailable, continuing lexical-only"
                );
                None
            }
        }
    }

    /// Embed a batch of texts for corpus loading.
    ///
    /// Unlike [`embed`](Self::embed), failures are returned so the caller can
    /// decide how to degrade. Returns an empty list when disabled.
    pub async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        match self.provider.as_ref() {
            Some(provider) if !texts.is_empty() => provider.embed_batch(texts).await,
            _ => Ok(Vec::new()),
        }
    }
}
