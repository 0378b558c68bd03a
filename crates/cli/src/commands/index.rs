//! Index command handler.
//!
//! Loads pre-chunked contract passages into the local store.

use super::setup::{build_embedder, open_store};
use clap::Args;
use clause_core::{config::AppConfig, AppResult};
use clause_knowledge::{load_corpus, IngestOptions};
use std::path::PathBuf;

/// Load a corpus from JSON Lines files
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Corpus key (e.g. NX)
    pub corpus: String,

    /// A .jsonl file or a directory containing them
    pub path: PathBuf,

    /// Remove the corpus before loading
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command for corpus '{}'", self.corpus);

        let store = open_store(config)?;
        let embedder = build_embedder(config);
        let options = IngestOptions {
            corpus_key: self.corpus.trim().to_uppercase(),
            path: self.path.clone(),
            reset: self.reset,
            batch_size: config.embedding.batch_size,
        };

        let stats = load_corpus(&store, &embedder, &options).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!(
                "Indexed {} chunks from {} documents ({} files) in {:.2}s",
                stats.chunks, stats.documents, stats.files, stats.duration_secs
            );
            if stats.embedded_chunks > 0 {
                println!("  {} chunks embedded", stats.embedded_chunks);
            }
            if stats.skipped_lines > 0 {
                println!("  {} lines skipped", stats.skipped_lines);
            }
        }

        Ok(())
    }
}
