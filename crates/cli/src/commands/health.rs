//! Health command handler.

use super::setup::open_store;
use clap::Args;
use clause_core::{config::AppConfig, AppResult};
use clause_knowledge::{ContractStore, StoreStats};

/// Check that the contract store is reachable
#[derive(Args, Debug)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HealthCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing health command");

        let (status, stats, error) = match open_store(config) {
            Ok(store) => match store.health().await {
                Ok(()) => {
                    let stats = store.stats(None).await.unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "Failed to read store counts");
                        StoreStats::default()
                    });
                    ("ok", stats, None)
                }
                Err(e) => ("degraded", StoreStats::default(), Some(e.to_string())),
            },
            Err(e) => ("degraded", StoreStats::default(), Some(e.to_string())),
        };

        if let Some(ref error) = error {
            tracing::warn!(error = %error, "Contract store unhealthy");
        }

        if self.json {
            let output = serde_json::json!({
                "status": status,
                "store": config.store_path(),
                "documents": stats.documents,
                "chunks": stats.chunks,
                "embeddedChunks": stats.embedded_chunks,
                "provider": config.provider,
                "embeddingProvider": config.embedding.provider,
                "error": error,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Status:     {}", status);
            println!("Store:      {}", config.store_path().display());
            println!(
                "Contents:   {} documents, {} chunks ({} embedded)",
                stats.documents, stats.chunks, stats.embedded_chunks
            );
            println!("Model:      {} / {}", config.provider, config.model);
            println!("Embeddings: {}", config.embedding.provider);
        }

        Ok(())
    }
}
