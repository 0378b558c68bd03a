//! Sources command handler.
//!
//! Lists the registered corpora alongside what is stored for each.

use super::setup::open_store;
use clap::Args;
use clause_core::{config::AppConfig, AppResult};
use clause_knowledge::{contract_sources, ContractDocument, SqliteStore};

/// List known contract corpora and stored documents
#[derive(Args, Debug)]
pub struct SourcesCommand {
    /// Show a single corpus
    #[arg(long)]
    pub corpus: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SourcesCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing sources command");

        let sources: Vec<_> = contract_sources()
            .iter()
            .filter(|source| {
                self.corpus
                    .as_deref()
                    .map_or(true, |corpus| source.corpus_key.eq_ignore_ascii_case(corpus.trim()))
            })
            .collect();

        let store = match open_store(config) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!(error = %e, "Contract store unavailable, listing registry only");
                None
            }
        };

        let mut listing = Vec::with_capacity(sources.len());
        for source in sources {
            let documents = stored_documents(store.as_ref(), source.corpus_key).await;
            listing.push((source, documents));
        }

        if self.json {
            let output: Vec<_> = listing
                .iter()
                .map(|(source, documents)| {
                    serde_json::json!({
                        "source": source,
                        "documents": documents,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if listing.is_empty() {
            println!("No registered corpus matches");
            return Ok(());
        }

        for (source, documents) in &listing {
            println!("{}  {}", source.corpus_key, source.display_name);
            println!("  schema: {}", source.schema_version);
            for url in source.seed_urls {
                println!("  seed:   {}", url);
            }
            if documents.is_empty() {
                println!("  (no documents indexed)");
            }
            for document in documents {
                println!(
                    "  - {} [{}] indexed {}",
                    document.title,
                    document.id,
                    document.last_ingested_at.format("%Y-%m-%d %H:%M")
                );
            }
        }

        Ok(())
    }
}

async fn stored_documents(store: Option<&SqliteStore>, corpus_key: &str) -> Vec<ContractDocument> {
    let Some(store) = store else {
        return Vec::new();
    };

    store.list_documents(Some(corpus_key)).await.unwrap_or_else(|e| {
        tracing::warn!(corpus = corpus_key, error = %e, "Failed to list documents");
        Vec::new()
    })
}
