//! Shared wiring from configuration to knowledge components.

use clause_core::{config::AppConfig, AppResult};
use clause_knowledge::embeddings::create_provider;
use clause_knowledge::{AnswerService, AnswerSynthesizer, QueryEmbedder, Retriever, SqliteStore};
use clause_llm::{create_client, LlmClient};
use std::sync::Arc;

/// Open the configured contract store, creating `.clause/` when needed.
pub fn open_store(config: &AppConfig) -> AppResult<SqliteStore> {
    config.ensure_clause_dir()?;
    let path = config.store_path();
    tracing::debug!("Opening contract store at {:?}", path);
    SqliteStore::open(&path)
}

/// Build the embedder, falling back to lexical-only when it cannot be created.
pub fn build_embedder(config: &AppConfig) -> QueryEmbedder {
    let settings = &config.embedding;
    let api_key = config.resolve_api_key(&settings.provider);

    match create_provider(settings, api_key.as_deref()) {
        Ok(provider) => {
            if let Some(ref provider) = provider {
                tracing::debug!(
                    provider = provider.provider_name(),
                    model = provider.model_name(),
                    dimensions = provider.dimensions(),
                    "Embeddings enabled"
                );
            }
            QueryEmbedder::new(provider)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Embeddings unavailable, searching lexically only");
            QueryEmbedder::disabled()
        }
    }
}

/// Build the model client. `None` means answers degrade to cited excerpts.
pub fn build_client(config: &AppConfig) -> Option<Arc<dyn LlmClient>> {
    if config.provider.eq_ignore_ascii_case("none") {
        return None;
    }

    let endpoint = config.resolve_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);

    match create_client(&config.provider, endpoint.as_deref(), api_key.as_deref()) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!(provider = %config.provider, error = %e, "Language model unavailable");
            None
        }
    }
}

/// Assemble the answer service from configuration.
pub fn build_service(config: &AppConfig) -> AppResult<AnswerService> {
    let store = open_store(config)?;
    let retriever = Retriever::new(Arc::new(store), build_embedder(config));
    let synthesizer = AnswerSynthesizer::new(build_client(config), &config.model, config.answer.clone());

    Ok(AnswerService::new(retriever, synthesizer))
}
